use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Access tokens are always HS256; the header's algorithm is never trusted.
const ALGORITHM: Algorithm = Algorithm::HS256;
const REFRESH_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Mints signed access tokens and opaque refresh tokens.
pub struct TokenIssuer {
    key: EncodingKey,
    access_ttl: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            access_ttl,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.access_ttl())
    }

    #[must_use]
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue_access_token(&self, subject: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.access_ttl.num_seconds()),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.key)
            .map_err(|e| Error::Signing(e.to_string()))
    }

    pub fn issue_refresh_token(&self) -> Result<String> {
        issue_refresh_token()
    }
}

/// Validates access tokens against the process signing secret.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked below with no leeway so that a zero TTL is expired at once.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Returns the subject of a valid token.
    pub fn verify(&self, token: &str) -> Result<String> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => Error::ExpiredToken,
                _ => Error::InvalidToken,
            }
        })?;

        if Utc::now().timestamp() >= data.claims.exp {
            return Err(Error::ExpiredToken);
        }
        if data.claims.sub.is_empty() {
            return Err(Error::InvalidToken);
        }

        Ok(data.claims.sub)
    }
}

/// 256 random bits, URL-safe base64 without padding (43 characters).
pub fn issue_refresh_token() -> Result<String> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Entropy(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Storage key for a raw refresh token.
#[must_use]
pub fn hash_refresh_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
