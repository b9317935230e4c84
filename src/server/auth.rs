use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::{CurrentUser, NewAccount};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LogoutResponse, RefreshRequest, RegisterRequest, UserProfile};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::require_fields;

/// Runs blocking store and hashing work off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            tracing::error!("Blocking task failed: {}", e);
            ApiError::internal("Internal server error")
        })?
        .map_err(ApiError::from)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    require_fields(&[&req.username, &req.password, &req.email])?;

    let auth = state.auth.clone();
    let account = NewAccount::from(req);
    let pair = run_blocking(move || auth.register(&account)).await?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(pair))))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    require_fields(&[&req.username, &req.password])?;

    let auth = state.auth.clone();
    let pair = run_blocking(move || auth.login(&req.username, &req.password)).await?;

    Ok::<_, ApiError>(Json(ApiResponse::success(pair)))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> impl IntoResponse {
    require_fields(&[&req.refresh_token])?;

    let auth = state.auth.clone();
    let pair = run_blocking(move || auth.refresh(&req.refresh_token)).await?;

    Ok::<_, ApiError>(Json(ApiResponse::success(pair)))
}

pub async fn logout(
    CurrentUser(username): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let auth = state.auth.clone();
    let revoked_tokens = run_blocking(move || auth.logout(&username)).await?;

    Ok::<_, ApiError>(Json(ApiResponse::success(LogoutResponse { revoked_tokens })))
}

pub async fn me(
    CurrentUser(username): CurrentUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // The token outlived the account.
    let user = state
        .store
        .get_user(&username)?
        .ok_or(Error::InvalidToken)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(UserProfile::new(user, true))))
}
