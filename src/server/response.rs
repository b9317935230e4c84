use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::Error;

const BEARER_CHALLENGE: &str = "Bearer realm=\"jit-remote\"";

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_IMPLEMENTED,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidUsername
            | Error::InvalidEmail
            | Error::WeakPassword(_)
            | Error::BadRequest(_) => ApiError::bad_request(err.to_string()),

            Error::UserAlreadyExists => ApiError::conflict("Username already exists"),
            Error::EmailAlreadyExists => ApiError::conflict("Email already exists"),
            Error::RepositoryAlreadyExists => ApiError::conflict("Repository already exists"),
            Error::AlreadyContributor => ApiError::conflict("User is already a contributor"),

            // Do not reveal which half of the credentials was wrong.
            Error::UserNotFound | Error::IncorrectPassword => {
                ApiError::unauthorized("Invalid username or password")
            }

            Error::ExpiredToken => ApiError::unauthorized("Token expired, log in again"),
            Error::RevokedToken => ApiError::unauthorized("Token revoked, log in again"),
            Error::InvalidToken | Error::InvalidRefreshToken => {
                ApiError::unauthorized("Malformed or invalid token")
            }
            Error::UsernameNotInContext => ApiError::unauthorized("Authentication required"),

            Error::NotOwner => ApiError::forbidden("Only the repository owner can do this"),
            Error::NotContributor => {
                ApiError::forbidden("Only repository contributors can do this")
            }

            Error::RepositoryNotFound => ApiError::not_found("Repository not found"),
            Error::NoSuchMembership => ApiError::not_found("User is not a contributor"),

            Error::NotImplemented(what) => {
                ApiError::not_implemented(format!("{what} is not implemented"))
            }

            Error::Database(_)
            | Error::Io(_)
            | Error::Config(_)
            | Error::Conflict(_)
            | Error::CorruptData(_)
            | Error::Hashing(_)
            | Error::Signing(_)
            | Error::Entropy(_) => {
                tracing::error!("Internal error: {}", err);
                ApiError::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message });
        let mut response = (self.status, Json(body)).into_response();

        if self.status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(BEARER_CHALLENGE),
            );
        }

        response
    }
}
