mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Principal records. Username is the identity key; email is unique.
pub trait AccountStore: Send + Sync {
    /// Fails with `UserAlreadyExists` or `EmailAlreadyExists` when the write
    /// violates a uniqueness constraint.
    fn create_user(&self, user: &User) -> Result<()>;
    fn get_user(&self, username: &str) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn delete_user(&self, username: &str) -> Result<bool>;
}

/// Durable refresh-token records, keyed by token digest.
pub trait RefreshTokenStore: Send + Sync {
    /// Fails with `Conflict` if the digest is already present.
    fn store_refresh_token(&self, token: &RefreshToken) -> Result<()>;
    fn get_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>>;
    /// Returns false if the token was absent or already revoked.
    fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool>;
    /// Returns the number of tokens that transitioned to revoked.
    fn revoke_all_refresh_tokens(&self, owner: &str) -> Result<usize>;
    fn list_refresh_tokens(&self, owner: &str) -> Result<Vec<RefreshToken>>;
}

/// Repository metadata and contributor membership.
pub trait RepoStore: Send + Sync {
    fn create_repo(&self, repo: &Repo) -> Result<()>;
    fn get_repo(&self, owner: &str, name: &str) -> Result<Option<Repo>>;
    fn list_owned_repos(&self, owner: &str) -> Result<Vec<Repo>>;
    fn list_contributed_repos(&self, contributor: &str) -> Result<Vec<Repo>>;

    /// Fails with `CorruptData` if the stored value is not a known visibility.
    fn get_visibility(&self, owner: &str, name: &str) -> Result<Option<Visibility>>;
    fn get_repo_secret(&self, owner: &str, name: &str) -> Result<Option<String>>;

    fn is_contributor(&self, owner: &str, name: &str, contributor: &str) -> Result<bool>;
    /// Explicit contributors only; the owner is not stored as a member.
    fn list_contributors(&self, owner: &str, name: &str) -> Result<Vec<String>>;
    /// Fails with `AlreadyContributor` if the membership already exists.
    fn add_contributor(&self, owner: &str, name: &str, contributor: &str) -> Result<()>;
    fn remove_contributor(&self, owner: &str, name: &str, contributor: &str) -> Result<bool>;
}

/// Store is the full persistence collaborator used by the server.
pub trait Store: AccountStore + RefreshTokenStore + RepoStore {
    fn initialize(&self) -> Result<()>;
}
