//! Process configuration: TOML file, then environment, then CLI flags.
//!
//! The value is built once at startup and handed to the components that need
//! it. Nothing below `main` reads the environment.

mod auth;
mod server;

pub use auth::AuthConfig;
pub use server::ServerConfig;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Secrets shorter than this are accepted with a warning.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Reads the optional TOML file and applies overrides from the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Applies overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(ttl) = lookup("JWT_ACCESS_TTL_SECS") {
            self.auth.access_token_ttl_secs = parse_var("JWT_ACCESS_TTL_SECS", &ttl)?;
        }
        if let Some(ttl) = lookup("JWT_REFRESH_TTL_SECS") {
            self.auth.refresh_token_ttl_secs = parse_var("JWT_REFRESH_TTL_SECS", &ttl)?;
        }
        if let Some(rotate) = lookup("JIT_ROTATE_REFRESH_TOKENS") {
            self.auth.rotate_refresh_tokens = parse_var("JIT_ROTATE_REFRESH_TOKENS", &rotate)?;
        }
        if let Some(host) = lookup("JIT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("JIT_PORT") {
            self.server.port = parse_var("JIT_PORT", &port)?;
        }
        if let Some(dir) = lookup("JIT_DATA_DIR") {
            self.server.data_dir = dir.into();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let secret_len = self.auth.jwt_secret.len();
        if secret_len == 0 {
            return Err(Error::Config(
                "JWT secret is empty; set JWT_SECRET or auth.jwt_secret".to_string(),
            ));
        }
        if secret_len < MIN_SECRET_LEN {
            tracing::warn!(
                "JWT secret is only {} bytes; use at least {}",
                secret_len,
                MIN_SECRET_LEN
            );
        }
        if self.auth.password_iterations == 0 || self.auth.password_parallelism == 0 {
            return Err(Error::Config(
                "password iterations and parallelism must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value for {key}: '{value}'")))
}
