pub const SCHEMA: &str = r#"
-- Principals; username is the identity key
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    full_name TEXT,
    bio TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Refresh tokens are soft-deleted through revocation and kept for audit
CREATE TABLE IF NOT EXISTS refresh_tokens (
    token_hash TEXT PRIMARY KEY,          -- sha256 hex of the raw token
    owner TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    revoked INTEGER NOT NULL DEFAULT 0,
    revoked_at TEXT
);

-- Repositories
CREATE TABLE IF NOT EXISTS repos (
    owner TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT,
    visibility TEXT NOT NULL DEFAULT 'PRIVATE' CHECK (visibility IN ('PUBLIC', 'PRIVATE')),
    secret TEXT NOT NULL,                 -- remote secret handed to contributors
    created_at TEXT DEFAULT (datetime('now')),

    PRIMARY KEY (owner, name)
);

-- Explicit contributors; the owner is implicit and never stored here
CREATE TABLE IF NOT EXISTS repo_contributors (
    owner TEXT NOT NULL,
    repo_name TEXT NOT NULL,
    contributor TEXT NOT NULL REFERENCES users(username) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),

    PRIMARY KEY (owner, repo_name, contributor),
    FOREIGN KEY (owner, repo_name) REFERENCES repos(owner, name) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_refresh_tokens_owner ON refresh_tokens(owner);
CREATE INDEX IF NOT EXISTS idx_repo_contributors_contributor ON repo_contributors(contributor);
"#;
