//! Database row types — these map directly to SQLite rows.
//! Converted into codedrop-types models at the adapter boundary.

use chrono::{DateTime, NaiveDateTime, Utc};
use codedrop_types::{Contribution, ContributionStatus, User};

use crate::BackendError;

/// Stored timestamp layout. Sorts lexicographically and lines up with
/// SQLite's `datetime('now')`, which is the same layout without the fraction.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, BackendError> {
    // `%.f` also accepts a missing fraction
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| BackendError::Timestamp(raw.to_string()))
}

pub struct ContributionRow {
    pub id: i64,
    pub username: String,
    pub filename: String,
    pub line_number: Option<i64>,
    pub code: String,
    pub status: Option<String>,
    pub created_at: String,
}

impl ContributionRow {
    pub const COLUMNS: &'static str =
        "id, username, filename, line_number, code, status, created_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            filename: row.get(2)?,
            line_number: row.get(3)?,
            code: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl TryFrom<ContributionRow> for Contribution {
    type Error = BackendError;

    fn try_from(row: ContributionRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_deref() {
            Some(raw) => raw.parse()?,
            None => ContributionStatus::Pending,
        };

        Ok(Contribution {
            id: row.id,
            username: row.username,
            filename: row.filename,
            line_number: row.line_number,
            code: row.code,
            status,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub is_channel_owner: Option<bool>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: i64,
    pub created_at: String,
}

impl UserRow {
    pub const COLUMNS: &'static str =
        "id, username, is_channel_owner, access_token, refresh_token, token_expires_at, created_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            is_channel_owner: row.get(2)?,
            access_token: row.get(3)?,
            refresh_token: row.get(4)?,
            token_expires_at: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = BackendError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            is_channel_owner: row.is_channel_owner.unwrap_or(false),
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            token_expires_at: row.token_expires_at,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}
