use std::os::raw::c_int;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, ffi, params};

use super::schema::SCHEMA;
use super::{AccountStore, RefreshTokenStore, RepoStore, Store};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(column: &str, s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            tracing::error!("Invalid datetime in {}: '{}' - {}", column, s, e);
            Error::CorruptData(format!("{column} has invalid datetime '{s}'"))
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Returns the extended result code and message of a constraint violation.
fn constraint_violation(err: &rusqlite::Error) -> Option<(c_int, &str)> {
    match err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            Some((e.extended_code, msg.as_deref().unwrap_or("")))
        }
        _ => None,
    }
}

fn is_key_collision(code: c_int) -> bool {
    code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY || code == ffi::SQLITE_CONSTRAINT_UNIQUE
}

/// User row as stored; timestamps are checked when converting to a `User`.
struct UserRow {
    username: String,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    bio: Option<String>,
    created_at: String,
}

impl UserRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            username: row.get(0)?,
            email: row.get(1)?,
            password_hash: row.get(2)?,
            full_name: row.get(3)?,
            bio: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_user(self) -> Result<User> {
        Ok(User {
            created_at: parse_datetime("users.created_at", &self.created_at)?,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            full_name: self.full_name,
            bio: self.bio,
        })
    }
}

struct RefreshTokenRow {
    token_hash: String,
    owner: String,
    created_at: String,
    revoked: bool,
    revoked_at: Option<String>,
}

impl RefreshTokenRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            token_hash: row.get(0)?,
            owner: row.get(1)?,
            created_at: row.get(2)?,
            revoked: row.get(3)?,
            revoked_at: row.get(4)?,
        })
    }

    /// An unreadable `created_at` must not pass for a fresh token.
    fn into_token(self) -> Result<RefreshToken> {
        Ok(RefreshToken {
            created_at: parse_datetime("refresh_tokens.created_at", &self.created_at)?,
            revoked_at: self
                .revoked_at
                .map(|s| parse_datetime("refresh_tokens.revoked_at", &s))
                .transpose()?,
            token_hash: self.token_hash,
            owner: self.owner,
            revoked: self.revoked,
        })
    }
}

/// Repo row as stored; visibility is checked when converting to a `Repo`.
struct RepoRow {
    owner: String,
    name: String,
    description: Option<String>,
    visibility: String,
    secret: String,
    created_at: String,
}

impl RepoRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            owner: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            visibility: row.get(3)?,
            secret: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_repo(self) -> Result<Repo> {
        let visibility = parse_visibility(&self.owner, &self.name, &self.visibility)?;
        Ok(Repo {
            visibility,
            created_at: parse_datetime("repos.created_at", &self.created_at)?,
            owner: self.owner,
            name: self.name,
            description: self.description,
            secret: self.secret,
        })
    }
}

fn parse_visibility(owner: &str, name: &str, raw: &str) -> Result<Visibility> {
    raw.parse::<Visibility>().map_err(|_| {
        tracing::error!("Repository {owner}/{name} has invalid visibility '{raw}'");
        Error::CorruptData(format!(
            "repository {owner}/{name} has invalid visibility '{raw}'"
        ))
    })
}

const REPO_COLUMNS: &str = "r.owner, r.name, r.description, r.visibility, r.secret, r.created_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }
}

impl AccountStore for SqliteStore {
    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (username, email, password_hash, full_name, bio, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                user.username,
                user.email,
                user.password_hash,
                user.full_name,
                user.bio,
                format_datetime(&user.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) => match constraint_violation(&e) {
                Some((code, msg)) if is_key_collision(code) && msg.contains("users.email") => {
                    Err(Error::EmailAlreadyExists)
                }
                Some((code, _)) if is_key_collision(code) => Err(Error::UserAlreadyExists),
                _ => Err(Error::from(e)),
            },
        }
    }

    fn get_user(&self, username: &str) -> Result<Option<User>> {
        let row = self
            .conn()
            .query_row(
                "SELECT username, email, password_hash, full_name, bio, created_at
                 FROM users WHERE username = ?1",
                params![username],
                UserRow::read,
            )
            .optional()?;

        row.map(UserRow::into_user).transpose()
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = self
            .conn()
            .query_row(
                "SELECT username, email, password_hash, full_name, bio, created_at
                 FROM users WHERE email = ?1",
                params![email],
                UserRow::read,
            )
            .optional()?;

        row.map(UserRow::into_user).transpose()
    }

    fn delete_user(&self, username: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE username = ?1", params![username])?;
        Ok(rows > 0)
    }
}

impl RefreshTokenStore for SqliteStore {
    fn store_refresh_token(&self, token: &RefreshToken) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO refresh_tokens (token_hash, owner, created_at, revoked, revoked_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                token.token_hash,
                token.owner,
                format_datetime(&token.created_at),
                token.revoked,
                token.revoked_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) => match constraint_violation(&e) {
                Some((code, _)) if is_key_collision(code) => {
                    Err(Error::Conflict("refresh token collision".to_string()))
                }
                Some((code, _)) if code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    Err(Error::UserNotFound)
                }
                _ => Err(Error::from(e)),
            },
        }
    }

    fn get_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshToken>> {
        let row = self
            .conn()
            .query_row(
                "SELECT token_hash, owner, created_at, revoked, revoked_at
                 FROM refresh_tokens WHERE token_hash = ?1",
                params![token_hash],
                RefreshTokenRow::read,
            )
            .optional()?;

        row.map(RefreshTokenRow::into_token).transpose()
    }

    fn revoke_refresh_token(&self, token_hash: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE refresh_tokens SET revoked = 1, revoked_at = ?2
             WHERE token_hash = ?1 AND revoked = 0",
            params![token_hash, format_datetime(&Utc::now())],
        )?;
        Ok(rows > 0)
    }

    fn revoke_all_refresh_tokens(&self, owner: &str) -> Result<usize> {
        let rows = self.conn().execute(
            "UPDATE refresh_tokens SET revoked = 1, revoked_at = ?2
             WHERE owner = ?1 AND revoked = 0",
            params![owner, format_datetime(&Utc::now())],
        )?;
        Ok(rows)
    }

    fn list_refresh_tokens(&self, owner: &str) -> Result<Vec<RefreshToken>> {
        let rows = {
            let conn = self.conn();
            let mut stmt = conn.prepare(
                "SELECT token_hash, owner, created_at, revoked, revoked_at
                 FROM refresh_tokens WHERE owner = ?1 ORDER BY created_at",
            )?;
            let rows = stmt.query_map(params![owner], RefreshTokenRow::read)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        rows.into_iter().map(RefreshTokenRow::into_token).collect()
    }
}

impl RepoStore for SqliteStore {
    fn create_repo(&self, repo: &Repo) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO repos (owner, name, description, visibility, secret, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                repo.owner,
                repo.name,
                repo.description,
                repo.visibility.as_str(),
                repo.secret,
                format_datetime(&repo.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) => match constraint_violation(&e) {
                Some((code, _)) if is_key_collision(code) => Err(Error::RepositoryAlreadyExists),
                Some((code, _)) if code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    Err(Error::UserNotFound)
                }
                _ => Err(Error::from(e)),
            },
        }
    }

    fn get_repo(&self, owner: &str, name: &str) -> Result<Option<Repo>> {
        let row = {
            let conn = self.conn();
            conn.query_row(
                &format!("SELECT {REPO_COLUMNS} FROM repos r WHERE r.owner = ?1 AND r.name = ?2"),
                params![owner, name],
                RepoRow::read,
            )
            .optional()?
        };

        row.map(RepoRow::into_repo).transpose()
    }

    fn list_owned_repos(&self, owner: &str) -> Result<Vec<Repo>> {
        let rows = {
            let conn = self.conn();
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPO_COLUMNS} FROM repos r WHERE r.owner = ?1 ORDER BY r.name"
            ))?;
            let rows = stmt.query_map(params![owner], RepoRow::read)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        rows.into_iter().map(RepoRow::into_repo).collect()
    }

    fn list_contributed_repos(&self, contributor: &str) -> Result<Vec<Repo>> {
        let rows = {
            let conn = self.conn();
            let mut stmt = conn.prepare(&format!(
                "SELECT {REPO_COLUMNS} FROM repos r
                 INNER JOIN repo_contributors rc
                 ON r.owner = rc.owner AND r.name = rc.repo_name
                 WHERE rc.contributor = ?1
                 ORDER BY r.owner, r.name"
            ))?;
            let rows = stmt.query_map(params![contributor], RepoRow::read)?;
            rows.collect::<std::result::Result<Vec<_>, _>>()?
        };

        rows.into_iter().map(RepoRow::into_repo).collect()
    }

    fn get_visibility(&self, owner: &str, name: &str) -> Result<Option<Visibility>> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT visibility FROM repos WHERE owner = ?1 AND name = ?2",
                params![owner, name],
                |row| row.get(0),
            )
            .optional()?;

        raw.map(|v| parse_visibility(owner, name, &v)).transpose()
    }

    fn get_repo_secret(&self, owner: &str, name: &str) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT secret FROM repos WHERE owner = ?1 AND name = ?2",
                params![owner, name],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }

    fn is_contributor(&self, owner: &str, name: &str, contributor: &str) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM repo_contributors
             WHERE owner = ?1 AND repo_name = ?2 AND contributor = ?3",
            params![owner, name, contributor],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list_contributors(&self, owner: &str, name: &str) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT contributor FROM repo_contributors
             WHERE owner = ?1 AND repo_name = ?2 ORDER BY contributor",
        )?;

        let rows = stmt.query_map(params![owner, name], |row| row.get(0))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn add_contributor(&self, owner: &str, name: &str, contributor: &str) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO repo_contributors (owner, repo_name, contributor, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![owner, name, contributor, format_datetime(&Utc::now())],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) => match constraint_violation(&e) {
                Some((code, _)) if is_key_collision(code) => Err(Error::AlreadyContributor),
                Some((code, _)) if code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    Err(Error::RepositoryNotFound)
                }
                _ => Err(Error::from(e)),
            },
        }
    }

    fn remove_contributor(&self, owner: &str, name: &str, contributor: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM repo_contributors
             WHERE owner = ?1 AND repo_name = ?2 AND contributor = ?3",
            params![owner, name, contributor],
        )?;
        Ok(rows > 0)
    }
}
