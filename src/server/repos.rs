use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use rand::{RngCore, rngs::OsRng};

use crate::access::{AccessPolicy, RepoAction, grant_contributor, revoke_contributor};
use crate::auth::CurrentUser;
use crate::error::{Error, Result};
use crate::server::AppState;
use crate::server::dto::{
    ContributorRequest, ContributorResponse, CreateRepoRequest, RemoteResponse, RepoDetail,
};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::validate_repo_name;
use crate::types::Repo;

const REPO_SECRET_BYTES: usize = 32;

/// Hex-encoded 256-bit remote secret.
fn generate_repo_secret() -> Result<String> {
    let mut bytes = [0u8; REPO_SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Entropy(e.to_string()))?;
    Ok(hex::encode(bytes))
}

pub async fn create_repo(
    CurrentUser(owner): CurrentUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateRepoRequest>,
) -> impl IntoResponse {
    validate_repo_name(&req.name)?;

    let repo = Repo {
        owner,
        name: req.name,
        description: req
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        visibility: req.visibility,
        secret: generate_repo_secret()?,
        created_at: Utc::now(),
    };

    state.store.create_repo(&repo)?;
    tracing::info!(
        "Created {} repository {}/{}",
        repo.visibility,
        repo.owner,
        repo.name
    );

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(repo))))
}

pub async fn get_repo(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    AccessPolicy::new(store).authorize(RepoAction::ViewMetadata, &owner, &name, &requester)?;

    let repo = store
        .get_repo(&owner, &name)?
        .ok_or(Error::RepositoryNotFound)?;

    let mut contributors = vec![repo.owner.clone()];
    contributors.extend(store.list_contributors(&owner, &name)?);

    Ok::<_, ApiError>(Json(ApiResponse::success(RepoDetail { repo, contributors })))
}

pub async fn get_remote(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    AccessPolicy::new(store).authorize(RepoAction::ReadSecret, &owner, &name, &requester)?;

    let secret = store
        .get_repo_secret(&owner, &name)?
        .ok_or(Error::RepositoryNotFound)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RemoteResponse {
        owner,
        name,
        secret,
    })))
}

pub async fn add_contributor(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
    Json(req): Json<ContributorRequest>,
) -> impl IntoResponse {
    let target = req.target.trim();
    if target.is_empty() {
        return Err(ApiError::bad_request("target is required"));
    }

    grant_contributor(state.store.as_ref(), &owner, &name, &requester, target).map_err(
        |e| match e {
            Error::UserNotFound => ApiError::not_found("User not found"),
            other => ApiError::from(other),
        },
    )?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(ContributorResponse {
            owner,
            name,
            contributor: target.to_string(),
        })),
    ))
}

pub async fn remove_contributor(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((owner, name, target)): Path<(String, String, String)>,
) -> impl IntoResponse {
    revoke_contributor(state.store.as_ref(), &owner, &name, &requester, &target)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn push(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> impl IntoResponse {
    AccessPolicy::new(state.store.as_ref()).authorize(
        RepoAction::Push,
        &owner,
        &name,
        &requester,
    )?;

    Err::<StatusCode, _>(ApiError::from(Error::NotImplemented("push")))
}

pub async fn pull(
    CurrentUser(requester): CurrentUser,
    State(state): State<Arc<AppState>>,
    Path((owner, name)): Path<(String, String)>,
) -> impl IntoResponse {
    AccessPolicy::new(state.store.as_ref()).authorize(
        RepoAction::Pull,
        &owner,
        &name,
        &requester,
    )?;

    Err::<StatusCode, _>(ApiError::from(Error::NotImplemented("pull")))
}
