use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    // Input validation
    #[error("username must be 5-20 characters of a-z, 0-9, '_' or '-'")]
    InvalidUsername,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password {0}")]
    WeakPassword(&'static str),

    #[error("bad request: {0}")]
    BadRequest(String),

    // Accounts
    #[error("user already exists")]
    UserAlreadyExists,

    #[error("email already exists")]
    EmailAlreadyExists,

    #[error("user not found")]
    UserNotFound,

    #[error("incorrect password")]
    IncorrectPassword,

    // Tokens
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("token revoked")]
    RevokedToken,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("username not in request context")]
    UsernameNotInContext,

    // Repository access
    #[error("requester is not the repository owner")]
    NotOwner,

    #[error("requester is not a repository contributor")]
    NotContributor,

    #[error("repository not found")]
    RepositoryNotFound,

    #[error("repository already exists")]
    RepositoryAlreadyExists,

    #[error("user is already a contributor")]
    AlreadyContributor,

    #[error("no such membership")]
    NoSuchMembership,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("corrupt data: {0}")]
    CorruptData(String),

    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    // Crypto
    #[error("failed to hash credential: {0}")]
    Hashing(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("entropy source failure: {0}")]
    Entropy(String),
}

pub type Result<T> = std::result::Result<T, Error>;
