mod middleware;
mod password;
mod service;
mod token;
pub mod validation;

pub use middleware::{AuthenticatedUser, CurrentUser, require_auth};
pub use password::CredentialDigest;
pub use service::{AuthService, NewAccount, TokenPair};
pub use token::{Claims, TokenIssuer, TokenVerifier, hash_refresh_token, issue_refresh_token};
