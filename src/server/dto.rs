use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::NewAccount;
use crate::types::{Repo, User, Visibility};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        NewAccount {
            username: req.username,
            password: req.password,
            full_name: req.full_name,
            email: req.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub revoked_tokens: usize,
}

/// Public profile. Email is only shown to the user themselves.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    #[must_use]
    pub fn new(user: User, include_email: bool) -> Self {
        Self {
            username: user.username,
            email: include_email.then_some(user.email),
            full_name: user.full_name,
            bio: user.bio,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRepoRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Serialize)]
pub struct RepoDetail {
    #[serde(flatten)]
    pub repo: Repo,
    /// Owner first, then explicit contributors.
    pub contributors: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoteResponse {
    pub owner: String,
    pub name: String,
    pub secret: String,
}

#[derive(Debug, Deserialize)]
pub struct ContributorRequest {
    #[serde(default)]
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct ContributorResponse {
    pub owner: String,
    pub name: String,
    pub contributor: String,
}
