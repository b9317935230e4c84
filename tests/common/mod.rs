//! In-process test harness: a router over a fresh on-disk database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use jit_remote::config::AuthConfig;
use jit_remote::server::{AppState, create_router};
use jit_remote::store::{SqliteStore, Store};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "Str0ng!Pass";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret-0123456789abcdef".to_string(),
        password_memory_kib: 1024,
        password_iterations: 1,
        password_parallelism: 1,
        ..AuthConfig::default()
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    _temp: TempDir,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_auth_config())
    }

    pub fn with_config(auth: AuthConfig) -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let store = SqliteStore::new(temp.path().join("test.db")).expect("failed to open store");
        store.initialize().expect("failed to initialize store");

        let state = AppState::new(Arc::new(store), &auth).expect("failed to build state");
        Self {
            _temp: temp,
            router: create_router(Arc::new(state)),
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let request = match body {
            Some(json_body) => builder
                .body(Body::from(serde_json::to_string(&json_body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request("DELETE", uri, Some(token), None).await
    }

    /// Registers `username` with `<username>@x.com` and returns the token pair.
    pub async fn register(&self, username: &str) -> Value {
        let response = self
            .post(
                "/auth/register",
                None,
                json!({
                    "username": username,
                    "password": PASSWORD,
                    "email": format!("{username}@x.com"),
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.data().clone()
    }

    /// Registers `username` and returns its access token.
    pub async fn access_token(&self, username: &str) -> String {
        self.register(username).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn create_repo(&self, token: &str, name: &str, visibility: &str) -> TestResponse {
        self.post(
            "/api/v1/repos",
            Some(token),
            json!({ "name": name, "visibility": visibility }),
        )
        .await
    }
}
