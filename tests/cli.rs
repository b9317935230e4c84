//! CLI integration tests for the jit-remote binary.
//!
//! Each test uses an isolated temp directory for the database.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use assert_cmd::Command;
use jit_remote::store::{AccountStore, SqliteStore};
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("jit-remote").expect("failed to find binary");
    cmd.env("NO_COLOR", "1")
        .env_remove("JWT_SECRET")
        .env_remove("JIT_DATA_DIR")
        .env_remove("JIT_HOST")
        .env_remove("JIT_PORT");
    cmd
}

#[test]
fn test_init_creates_database() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("data");

    cmd()
        .args(["init", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized database"));

    let db_path = data_dir.join("jit-remote.db");
    assert!(db_path.exists());

    let store = SqliteStore::new(&db_path).unwrap();
    assert!(store.get_user("alice").unwrap().is_none());
}

#[test]
fn test_init_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().to_str().unwrap();

    cmd().args(["init", "--data-dir", data_dir]).assert().success();
    cmd()
        .args(["init", "--data-dir", data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));
}

#[test]
fn test_serve_requires_secret() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().to_str().unwrap();

    cmd().args(["init", "--data-dir", data_dir]).assert().success();
    cmd()
        .args(["serve", "--data-dir", data_dir, "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JWT secret is empty"));
}

#[test]
fn test_serve_requires_init() {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join("missing");

    cmd()
        .env("JWT_SECRET", "cli-test-secret-0123456789abcdefghij")
        .args(["serve", "--data-dir", data_dir.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jit-remote init"));
}

#[test]
fn test_serve_rejects_bad_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[server\nport = ").unwrap();

    cmd()
        .args(["serve", "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}
