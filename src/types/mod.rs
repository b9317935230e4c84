mod models;

pub use models::{RefreshToken, Repo, User, Visibility};
