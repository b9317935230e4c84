use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use super::password::CredentialDigest;
use super::token::{TokenIssuer, hash_refresh_token};
use super::validation::{validate_email, validate_password, validate_username};
use crate::config::AuthConfig;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{RefreshToken, User};

/// Attempts at persisting a freshly minted refresh token before giving up.
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Registration, login, refresh and logout.
///
/// Every method does blocking store I/O and, for register and login, CPU-bound
/// hashing. Async callers should run them on a blocking thread.
pub struct AuthService {
    store: Arc<dyn Store>,
    digest: CredentialDigest,
    issuer: TokenIssuer,
    refresh_ttl: Duration,
    rotate_refresh_tokens: bool,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            store,
            digest: CredentialDigest::from_config(config)?,
            issuer: TokenIssuer::from_config(config),
            refresh_ttl: config.refresh_ttl(),
            rotate_refresh_tokens: config.rotate_refresh_tokens,
        })
    }

    pub fn register(&self, account: &NewAccount) -> Result<TokenPair> {
        validate_username(&account.username)?;
        validate_email(&account.email)?;
        validate_password(&account.password)?;

        if self.store.get_user(&account.username)?.is_some() {
            return Err(Error::UserAlreadyExists);
        }
        if self.store.get_user_by_email(&account.email)?.is_some() {
            return Err(Error::EmailAlreadyExists);
        }

        let user = User {
            username: account.username.clone(),
            email: account.email.clone(),
            password_hash: self.digest.digest(&account.password)?,
            full_name: account
                .full_name
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            bio: None,
            created_at: Utc::now(),
        };

        // A concurrent registration that slipped past the checks above is
        // caught here by the uniqueness constraints.
        self.store.create_user(&user)?;

        match self.issue_pair(&user.username) {
            Ok(pair) => {
                tracing::info!("Registered user {}", user.username);
                Ok(pair)
            }
            Err(e) => {
                tracing::error!(
                    "Registration of {} failed after account creation: {}",
                    user.username,
                    e
                );
                if let Err(cleanup) = self.store.delete_user(&user.username) {
                    tracing::error!(
                        "Failed to remove half-registered user {}: {}",
                        user.username,
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<TokenPair> {
        let user = self.store.get_user(username)?.ok_or_else(|| {
            tracing::debug!("Login for unknown user {}", username);
            Error::UserNotFound
        })?;

        if !self.digest.verify(&user.password_hash, password)? {
            tracing::warn!("Incorrect password for user {}", username);
            return Err(Error::IncorrectPassword);
        }

        let pair = self.issue_pair(&user.username)?;
        tracing::info!("User {} logged in", user.username);
        Ok(pair)
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Without rotation the presented refresh token is returned unchanged and
    /// stays valid until logout or expiry. With rotation it is revoked and a
    /// new one is minted; of two concurrent refreshes of the same token only
    /// one succeeds, the other gets `RevokedToken`.
    pub fn refresh(&self, raw_token: &str) -> Result<TokenPair> {
        let token_hash = hash_refresh_token(raw_token);
        let record = self
            .store
            .get_refresh_token(&token_hash)?
            .ok_or(Error::InvalidRefreshToken)?;

        if record.revoked {
            tracing::debug!("Refresh with revoked token for {}", record.owner);
            return Err(Error::RevokedToken);
        }
        if record.is_expired(Utc::now(), self.refresh_ttl) {
            tracing::debug!("Refresh with expired token for {}", record.owner);
            return Err(Error::ExpiredToken);
        }

        let user = self
            .store
            .get_user(&record.owner)?
            .ok_or(Error::UserNotFound)?;

        let access_token = self.issuer.issue_access_token(&user.username)?;

        let refresh_token = if self.rotate_refresh_tokens {
            if !self.store.revoke_refresh_token(&token_hash)? {
                return Err(Error::RevokedToken);
            }
            self.persist_refresh_token(&user.username)?
        } else {
            raw_token.to_string()
        };

        tracing::info!("Refreshed access token for {}", user.username);
        Ok(self.pair(access_token, refresh_token))
    }

    /// Revokes every refresh token of `username`. Returns how many were active.
    pub fn logout(&self, username: &str) -> Result<usize> {
        let revoked = self.store.revoke_all_refresh_tokens(username)?;
        tracing::info!("User {} logged out, revoked {} refresh tokens", username, revoked);
        Ok(revoked)
    }

    fn issue_pair(&self, username: &str) -> Result<TokenPair> {
        let access_token = self.issuer.issue_access_token(username)?;
        let refresh_token = self.persist_refresh_token(username)?;
        Ok(self.pair(access_token, refresh_token))
    }

    fn pair(&self, access_token: String, refresh_token: String) -> TokenPair {
        TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.issuer.access_ttl().num_seconds(),
        }
    }

    /// Mints and stores a refresh token, retrying with a fresh value on collision.
    fn persist_refresh_token(&self, owner: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let raw = self.issuer.issue_refresh_token()?;
            let record = RefreshToken::new(owner, hash_refresh_token(&raw), Utc::now());

            match self.store.store_refresh_token(&record) {
                Ok(()) => return Ok(raw),
                Err(Error::Conflict(msg)) if attempt < MAX_RETRIES => {
                    tracing::warn!("Refresh token collision (attempt {}): {}", attempt, msg);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
