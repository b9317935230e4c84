mod auth;
pub mod dto;
mod repos;
pub mod response;
mod router;
mod users;
pub mod validation;

pub use router::{AppState, create_router};
