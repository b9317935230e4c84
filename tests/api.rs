//! API integration tests, driving the router in-process.

mod common;

use axum::http::{StatusCode, header::WWW_AUTHENTICATE};
use jit_remote::config::AuthConfig;
use serde_json::json;

use common::{PASSWORD, TestApp, test_auth_config};

fn token(value: &serde_json::Value, field: &str) -> String {
    value[field].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_returns_token_pair() {
    let app = TestApp::new();
    let pair = app.register("alice").await;

    assert_eq!(pair["token_type"], "Bearer");
    assert_eq!(pair["expires_in"], 900);
    assert_eq!(token(&pair, "access_token").split('.').count(), 3);
    assert_eq!(token(&pair, "refresh_token").len(), 43);
}

#[tokio::test]
async fn test_register_duplicates() {
    let app = TestApp::new();
    app.register("alice").await;

    let response = app
        .post(
            "/auth/register",
            None,
            json!({ "username": "alice", "password": PASSWORD, "email": "other@x.com" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error(), "Username already exists");

    let response = app
        .post(
            "/auth/register",
            None,
            json!({ "username": "alice2", "password": PASSWORD, "email": "alice@x.com" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error(), "Email already exists");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let cases = [
        json!({ "username": "Al", "password": PASSWORD, "email": "al@x.com" }),
        json!({ "username": "alice", "password": PASSWORD, "email": "not-an-email" }),
        json!({ "username": "alice", "password": "password", "email": "alice@x.com" }),
    ];
    for body in cases {
        let response = app.post("/auth/register", None, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = app
        .post(
            "/auth/register",
            None,
            json!({ "username": "alice", "email": "alice@x.com" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "missing credentials");
}

// =============================================================================
// Login, refresh, logout
// =============================================================================

#[tokio::test]
async fn test_login_does_not_reveal_which_credential_failed() {
    let app = TestApp::new();
    app.register("alice").await;

    let wrong_password = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "alice", "password": "Wr0ng!Pass" }),
        )
        .await;
    let unknown_user = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "nobody", "password": PASSWORD }),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.error(), unknown_user.error());
    assert!(wrong_password.headers.get(WWW_AUTHENTICATE).is_some());
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = TestApp::new();
    let registered = app.register("alice").await;

    let login = app
        .post(
            "/auth/login",
            None,
            json!({ "username": "alice", "password": PASSWORD }),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let logged_in = login.data().clone();
    assert_ne!(
        token(&logged_in, "refresh_token"),
        token(&registered, "refresh_token")
    );

    for pair in [&registered, &logged_in] {
        let refreshed = app
            .post(
                "/auth/refresh",
                None,
                json!({ "refresh_token": token(pair, "refresh_token") }),
            )
            .await;
        assert_eq!(refreshed.status, StatusCode::OK);
        assert_eq!(
            refreshed.data()["refresh_token"],
            pair["refresh_token"]
        );
    }

    let access = token(&logged_in, "access_token");
    let logout = app.post("/auth/logout", Some(&access), json!({})).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.data()["revoked_tokens"], 2);

    for pair in [&registered, &logged_in] {
        let refreshed = app
            .post(
                "/auth/refresh",
                None,
                json!({ "refresh_token": token(pair, "refresh_token") }),
            )
            .await;
        assert_eq!(refreshed.status, StatusCode::UNAUTHORIZED);
        assert_eq!(refreshed.error(), "Token revoked, log in again");
    }
}

#[tokio::test]
async fn test_refresh_with_unknown_token() {
    let app = TestApp::new();
    let response = app
        .post(
            "/auth/refresh",
            None,
            json!({ "refresh_token": "does-not-exist" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Malformed or invalid token");
}

#[tokio::test]
async fn test_refresh_rotation() {
    let app = TestApp::with_config(AuthConfig {
        rotate_refresh_tokens: true,
        ..test_auth_config()
    });
    let pair = app.register("alice").await;
    let original = token(&pair, "refresh_token");

    let first = app
        .post("/auth/refresh", None, json!({ "refresh_token": original.as_str() }))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_ne!(token(first.data(), "refresh_token"), original);

    let replay = app
        .post("/auth/refresh", None, json!({ "refresh_token": original.as_str() }))
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Access tokens
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_bearer_token() {
    let app = TestApp::new();

    let response = app.request("GET", "/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers.get(WWW_AUTHENTICATE).unwrap(),
        "Bearer realm=\"jit-remote\""
    );

    let response = app.get("/auth/me", "not.a.token").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Malformed or invalid token");
}

#[tokio::test]
async fn test_expired_access_token() {
    let app = TestApp::with_config(AuthConfig {
        access_token_ttl_secs: 0,
        ..test_auth_config()
    });
    let access = app.access_token("alice").await;

    let response = app.get("/auth/me", &access).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Token expired, log in again");
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let other = TestApp::with_config(AuthConfig {
        jwt_secret: "a-completely-different-secret-value".to_string(),
        ..test_auth_config()
    });
    let foreign = other.access_token("alice").await;

    let app = TestApp::new();
    app.register("alice").await;
    let response = app.get("/auth/me", &foreign).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "Malformed or invalid token");
}

// =============================================================================
// Profiles
// =============================================================================

#[tokio::test]
async fn test_profiles() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;
    app.register("bobby").await;

    let me = app.get("/auth/me", &alice).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.data()["username"], "alice");
    assert_eq!(me.data()["email"], "alice@x.com");
    assert!(me.data().get("password_hash").is_none());

    let other = app.get("/api/v1/users/bobby", &alice).await;
    assert_eq!(other.status, StatusCode::OK);
    assert_eq!(other.data()["username"], "bobby");
    assert!(other.data().get("email").is_none());

    let missing = app.get("/api/v1/users/ghost", &alice).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Repositories
// =============================================================================

#[tokio::test]
async fn test_create_repo() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;

    let created = app.create_repo(&alice, "proj", "PRIVATE").await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["owner"], "alice");
    assert_eq!(created.data()["visibility"], "PRIVATE");
    assert!(created.data().get("secret").is_none());

    let duplicate = app.create_repo(&alice, "proj", "PUBLIC").await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let invalid = app.create_repo(&alice, "bad name", "PUBLIC").await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let defaulted = app
        .post("/api/v1/repos", Some(&alice), json!({ "name": "notes" }))
        .await;
    assert_eq!(defaulted.status, StatusCode::CREATED);
    assert_eq!(defaulted.data()["visibility"], "PRIVATE");
}

#[tokio::test]
async fn test_private_repo_contributor_lifecycle() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;
    let bobby = app.access_token("bobby").await;
    app.register("carol").await;

    app.create_repo(&alice, "proj", "PRIVATE").await;

    // Outsiders cannot tell the repository exists.
    let hidden = app.get("/api/v1/repos/alice/proj", &bobby).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
    let hidden = app.get("/api/v1/repos/alice/proj/remote", &bobby).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let granted = app
        .post(
            "/api/v1/repos/alice/proj/contributors",
            Some(&alice),
            json!({ "target": "bobby" }),
        )
        .await;
    assert_eq!(granted.status, StatusCode::CREATED);

    let again = app
        .post(
            "/api/v1/repos/alice/proj/contributors",
            Some(&alice),
            json!({ "target": "bobby" }),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let detail = app.get("/api/v1/repos/alice/proj", &bobby).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.data()["contributors"], json!(["alice", "bobby"]));

    let remote = app.get("/api/v1/repos/alice/proj/remote", &bobby).await;
    assert_eq!(remote.status, StatusCode::OK);
    assert_eq!(remote.data()["secret"].as_str().unwrap().len(), 64);

    // Contributors cannot manage membership.
    let forbidden = app
        .post(
            "/api/v1/repos/alice/proj/contributors",
            Some(&bobby),
            json!({ "target": "carol" }),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let revoked = app
        .delete("/api/v1/repos/alice/proj/contributors/bobby", &alice)
        .await;
    assert_eq!(revoked.status, StatusCode::NO_CONTENT);

    let revoked_again = app
        .delete("/api/v1/repos/alice/proj/contributors/bobby", &alice)
        .await;
    assert_eq!(revoked_again.status, StatusCode::NOT_FOUND);
    assert_eq!(revoked_again.error(), "User is not a contributor");

    let hidden = app.get("/api/v1/repos/alice/proj", &bobby).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grant_to_unknown_user() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;
    app.create_repo(&alice, "proj", "PRIVATE").await;

    let response = app
        .post(
            "/api/v1/repos/alice/proj/contributors",
            Some(&alice),
            json!({ "target": "ghost" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/api/v1/repos/alice/proj/contributors",
            Some(&alice),
            json!({ "target": "" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_repo_access() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;
    let bobby = app.access_token("bobby").await;
    app.create_repo(&alice, "docs", "PUBLIC").await;

    let detail = app.get("/api/v1/repos/alice/docs", &bobby).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.data()["contributors"], json!(["alice"]));

    let remote = app.get("/api/v1/repos/alice/docs/remote", &bobby).await;
    assert_eq!(remote.status, StatusCode::FORBIDDEN);

    let push = app
        .post("/api/v1/repos/alice/docs/push", Some(&bobby), json!({}))
        .await;
    assert_eq!(push.status, StatusCode::FORBIDDEN);

    let grant = app
        .post(
            "/api/v1/repos/alice/docs/contributors",
            Some(&bobby),
            json!({ "target": "bobby" }),
        )
        .await;
    assert_eq!(grant.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_push_and_pull_are_authorized_but_not_implemented() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;
    app.create_repo(&alice, "proj", "PRIVATE").await;

    let push = app
        .post("/api/v1/repos/alice/proj/push", Some(&alice), json!({}))
        .await;
    assert_eq!(push.status, StatusCode::NOT_IMPLEMENTED);

    let pull = app.get("/api/v1/repos/alice/proj/pull", &alice).await;
    assert_eq!(pull.status, StatusCode::NOT_IMPLEMENTED);

    let missing = app.get("/api/v1/repos/alice/nope/pull", &alice).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_user_repos() {
    let app = TestApp::new();
    let alice = app.access_token("alice").await;
    let bobby = app.access_token("bobby").await;
    app.create_repo(&alice, "docs", "PUBLIC").await;
    app.create_repo(&alice, "proj", "PRIVATE").await;

    let own = app.get("/api/v1/users/alice/repos", &alice).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.data().as_array().unwrap().len(), 2);

    let as_bobby = app.get("/api/v1/users/alice/repos", &bobby).await;
    let names: Vec<_> = as_bobby
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["docs"]);

    let missing = app.get("/api/v1/users/ghost/repos", &alice).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
