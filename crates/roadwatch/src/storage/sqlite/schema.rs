//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O. Partial updates bind `NULL` for untouched columns and
//! rely on `COALESCE` to keep the stored value.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- Roles table
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Users table
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    nickname TEXT NOT NULL UNIQUE,
    role_id INTEGER NOT NULL,
    coins INTEGER NOT NULL DEFAULT 0, -- hundredths
    validated INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Reports table
CREATE TABLE IF NOT EXISTS reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    report_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'PENDING',
    user_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status);
CREATE INDEX IF NOT EXISTS idx_reports_user_id ON reports(user_id);
"#;

// Report queries
pub const INSERT_REPORT: &str = r#"
INSERT INTO reports (date, latitude, longitude, report_type, severity, status, user_id, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
"#;

pub const SELECT_REPORT_BY_ID: &str = r#"
SELECT id, date, latitude, longitude, report_type, severity, status, user_id, created_at, updated_at
FROM reports
WHERE id = ?1
"#;

pub const SELECT_ALL_REPORTS: &str = r#"
SELECT id, date, latitude, longitude, report_type, severity, status, user_id, created_at, updated_at
FROM reports
ORDER BY id ASC
"#;

pub const PATCH_REPORT: &str = r#"
UPDATE reports
SET date = COALESCE(?2, date),
    latitude = COALESCE(?3, latitude),
    longitude = COALESCE(?4, longitude),
    report_type = COALESCE(?5, report_type),
    severity = COALESCE(?6, severity),
    status = COALESCE(?7, status),
    updated_at = ?8
WHERE id = ?1
"#;

pub const SAVE_REPORT: &str = r#"
UPDATE reports
SET date = ?2, latitude = ?3, longitude = ?4, report_type = ?5, severity = ?6,
    status = ?7, user_id = ?8, updated_at = ?9
WHERE id = ?1
"#;

pub const DELETE_REPORT: &str = r#"
DELETE FROM reports
WHERE id = ?1
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (email, nickname, role_id, coins, validated, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, email, nickname, role_id, coins, validated, created_at, updated_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, email, nickname, role_id, coins, validated, created_at, updated_at
FROM users
WHERE email = ?1
"#;

pub const SELECT_USER_BY_NICKNAME: &str = r#"
SELECT id, email, nickname, role_id, coins, validated, created_at, updated_at
FROM users
WHERE nickname = ?1
"#;

pub const SELECT_ALL_USERS: &str = r#"
SELECT id, email, nickname, role_id, coins, validated, created_at, updated_at
FROM users
ORDER BY id ASC
"#;

pub const PATCH_USER: &str = r#"
UPDATE users
SET email = COALESCE(?2, email),
    nickname = COALESCE(?3, nickname),
    role_id = COALESCE(?4, role_id),
    coins = COALESCE(?5, coins),
    validated = COALESCE(?6, validated),
    updated_at = ?7
WHERE id = ?1
"#;

pub const SAVE_USER: &str = r#"
UPDATE users
SET email = ?2, nickname = ?3, role_id = ?4, coins = ?5, validated = ?6, updated_at = ?7
WHERE id = ?1
"#;

pub const DELETE_USER: &str = r#"
DELETE FROM users
WHERE id = ?1
"#;

// Role queries
pub const INSERT_ROLE: &str = r#"
INSERT INTO roles (name)
VALUES (?1)
"#;

pub const SELECT_ROLE_BY_ID: &str = r#"
SELECT id, name
FROM roles
WHERE id = ?1
"#;

pub const SELECT_ROLE_BY_NAME: &str = r#"
SELECT id, name
FROM roles
WHERE name = ?1
"#;

pub const SELECT_ALL_ROLES: &str = r#"
SELECT id, name
FROM roles
ORDER BY id ASC
"#;

pub const SAVE_ROLE: &str = r#"
UPDATE roles
SET name = COALESCE(?2, name)
WHERE id = ?1
"#;

pub const DELETE_ROLE: &str = r#"
DELETE FROM roles
WHERE id = ?1
"#;
