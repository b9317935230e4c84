use std::fmt;

use serde::{Deserialize, Serialize};

/// Signing secret, token lifetimes and password hashing cost.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Access token lifetime. Zero yields tokens that are already expired.
    pub access_token_ttl_secs: u64,
    /// How long a refresh token stays usable after it was minted.
    pub refresh_token_ttl_secs: u64,
    /// Revoke the presented refresh token and mint a new one on every refresh.
    pub rotate_refresh_tokens: bool,
    pub password_memory_kib: u32,
    pub password_iterations: u32,
    pub password_parallelism: u32,
}

impl AuthConfig {
    #[must_use]
    pub fn access_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(clamp_secs(self.access_token_ttl_secs))
    }

    #[must_use]
    pub fn refresh_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(clamp_secs(self.refresh_token_ttl_secs))
    }
}

/// Lifetimes are capped at roughly a century.
const MAX_TTL_SECS: i64 = 100 * 366 * 24 * 60 * 60;

fn clamp_secs(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(MAX_TTL_SECS).min(MAX_TTL_SECS)
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: 15 * 60,
            refresh_token_ttl_secs: 7 * 24 * 60 * 60,
            rotate_refresh_tokens: false,
            password_memory_kib: 19 * 1024,
            password_iterations: 2,
            password_parallelism: 1,
        }
    }
}

// The secret must never end up in logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[redacted]")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("rotate_refresh_tokens", &self.rotate_refresh_tokens)
            .field("password_memory_kib", &self.password_memory_kib)
            .field("password_iterations", &self.password_iterations)
            .field("password_parallelism", &self.password_parallelism)
            .finish()
    }
}
