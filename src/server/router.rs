use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{delete, get, post},
};

use super::{auth, repos, users};
use crate::auth::{AuthService, TokenVerifier, require_auth};
use crate::config::AuthConfig;
use crate::error::Result;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<AuthService>,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            auth: Arc::new(AuthService::new(store.clone(), config)?),
            verifier: TokenVerifier::from_config(config),
            store,
        })
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Users
        .route("/users/{username}", get(users::get_profile))
        .route("/users/{username}/repos", get(users::list_repos))
        // Repos
        .route("/repos", post(repos::create_repo))
        .route("/repos/{owner}/{repo}", get(repos::get_repo))
        .route("/repos/{owner}/{repo}/remote", get(repos::get_remote))
        .route(
            "/repos/{owner}/{repo}/contributors",
            post(repos::add_contributor),
        )
        .route(
            "/repos/{owner}/{repo}/contributors/{target}",
            delete(repos::remove_contributor),
        )
        // Content transfer
        .route("/repos/{owner}/{repo}/push", post(repos::push))
        .route("/repos/{owner}/{repo}/pull", get(repos::pull))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let authenticated = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .nest("/api/v1", api_router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .merge(authenticated)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
