//! # jit-remote
//!
//! Remote repository server for jit: accounts, access and refresh tokens,
//! and per-repository access control. Usable both as a standalone binary and
//! as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! jit-remote = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jit_remote::config::Config;
//! use jit_remote::server::{AppState, create_router};
//! use jit_remote::store::{SqliteStore, Store};
//!
//! let config = Config::load(None)?;
//! config.validate()?;
//!
//! let store = SqliteStore::new(config.server.db_path())?;
//! store.initialize()?;
//!
//! let state = Arc::new(AppState::new(Arc::new(store), &config.auth)?);
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `jit-remote` binary. Disable with `default-features = false`.

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
