use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::error::Error;
use crate::server::AppState;
use crate::server::response::ApiError;

/// Verified subject of the request's access token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Extractor for the username placed into the request by [`require_auth`].
pub struct CurrentUser(pub String);

/// Rejects requests without a valid `Authorization: Bearer <access token>`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = extract_bearer_token(header)?;

    let username = state.verifier.verify(token).map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        ApiError::from(e)
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser(username));

    Ok(next.run(request).await)
}

fn extract_bearer_token(header: Option<&str>) -> Result<&str, ApiError> {
    let header = header.ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization scheme"))?
        .trim();

    if token.is_empty() {
        return Err(ApiError::from(Error::InvalidToken));
    }

    Ok(token)
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| CurrentUser(user.0.clone()))
            .ok_or_else(|| ApiError::from(Error::UsernameNotInContext))
    }
}
