use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A persisted refresh token. Only the SHA-256 digest of the raw token is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    #[serde(skip)]
    pub token_hash: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub revoked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    #[must_use]
    pub fn new(owner: &str, token_hash: String, created_at: DateTime<Utc>) -> Self {
        Self {
            token_hash,
            owner: owner.to_string(),
            created_at,
            revoked: false,
            revoked_at: None,
        }
    }

    /// A token is expired once `now >= created_at + max_refresh`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, max_refresh: Duration) -> bool {
        self.created_at
            .checked_add_signed(max_refresh)
            .is_none_or(|deadline| now >= deadline)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Private => "PRIVATE",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUBLIC" => Ok(Visibility::Public),
            "PRIVATE" => Ok(Visibility::Private),
            other => Err(Error::CorruptData(format!(
                "unrecognized repository visibility '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub owner: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub visibility: Visibility,
    #[serde(skip)]
    pub secret: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_parse() {
        assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("PRIVATE".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!(matches!(
            "public".parse::<Visibility>(),
            Err(Error::CorruptData(_))
        ));
        assert!(matches!(
            "INTERNAL".parse::<Visibility>(),
            Err(Error::CorruptData(_))
        ));
    }

    #[test]
    fn test_visibility_serde_uppercase() {
        let json = serde_json::to_string(&Visibility::Public).unwrap();
        assert_eq!(json, "\"PUBLIC\"");
        let parsed: Visibility = serde_json::from_str("\"PRIVATE\"").unwrap();
        assert_eq!(parsed, Visibility::Private);
    }

    #[test]
    fn test_refresh_token_expiry_boundary() {
        let created = Utc::now();
        let token = RefreshToken::new("alice", "hash".to_string(), created);
        let max = Duration::days(7);

        assert!(!token.is_expired(created, max));
        assert!(!token.is_expired(created + max - Duration::seconds(1), max));
        assert!(token.is_expired(created + max, max));
    }
}
