//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::Row;

use roadwatch_core::report::{Position, Report};
use roadwatch_core::user::{Coins, Role, User};

/// Convert a SQLite row to a Report.
///
/// Expected columns: id, date, latitude, longitude, report_type, severity,
/// status, user_id, created_at, updated_at
pub fn row_to_report(row: &Row) -> rusqlite::Result<Report> {
    let date: String = row.get(1)?;
    let report_type: String = row.get(4)?;
    let severity: String = row.get(5)?;
    let status: String = row.get(6)?;
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;

    Ok(Report {
        id: Some(row.get(0)?),
        date: parse_datetime(&date)?,
        position: Position::new(row.get(2)?, row.get(3)?),
        report_type: parse_label(&report_type)?,
        severity: parse_label(&severity)?,
        status: parse_label(&status)?,
        user_id: row.get(7)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert a SQLite row to a User.
///
/// Expected columns: id, email, nickname, role_id, coins, validated,
/// created_at, updated_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;

    Ok(User {
        id: Some(row.get(0)?),
        email: row.get(1)?,
        nickname: row.get(2)?,
        role_id: row.get(3)?,
        coins: Coins::from_cents(row.get(4)?),
        validated: row.get(5)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}

/// Convert a SQLite row to a Role.
///
/// Expected columns: id, name
pub fn row_to_role(row: &Row) -> rusqlite::Result<Role> {
    Ok(Role {
        id: Some(row.get(0)?),
        name: row.get(1)?,
    })
}

/// Parse an enum stored by its wire label (e.g. `POTHOLE`).
fn parse_label<T>(s: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime<Utc> for SQLite storage (RFC 3339).
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}
