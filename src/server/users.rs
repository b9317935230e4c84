use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::access::visible_repositories;
use crate::auth::CurrentUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::UserProfile;
use crate::server::response::{ApiError, ApiResponse};

pub async fn get_profile(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(&username)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let is_self = user.username == requester;
    Ok::<_, ApiError>(Json(ApiResponse::success(UserProfile::new(user, is_self))))
}

pub async fn list_repos(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let repos =
        visible_repositories(state.store.as_ref(), &username, &requester).map_err(|e| match e {
            Error::UserNotFound => ApiError::not_found("User not found"),
            other => ApiError::from(other),
        })?;

    Ok::<_, ApiError>(Json(ApiResponse::success(repos)))
}
