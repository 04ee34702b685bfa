use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ContributionStatus;

/// A submitted code snippet, attributed to a file and optionally a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub username: String,
    pub filename: String,
    /// `None` means the whole file, or that no line was given.
    pub line_number: Option<i64>,
    pub code: String,
    pub status: ContributionStatus,
    pub created_at: DateTime<Utc>,
}

/// Input for a new contribution. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContribution {
    pub username: String,
    pub filename: String,
    pub line_number: Option<i64>,
    pub code: String,
    #[serde(default)]
    pub status: ContributionStatus,
}

impl NewContribution {
    pub fn new(
        username: impl Into<String>,
        filename: impl Into<String>,
        line_number: Option<i64>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            filename: filename.into(),
            line_number,
            code: code.into(),
            status: ContributionStatus::Pending,
        }
    }
}

/// A contributor or channel owner with their OAuth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub is_channel_owner: bool,
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry in epoch milliseconds.
    pub token_expires_at: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A token expiring exactly at `now` counts as expired.
    pub fn token_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expires_at <= now.timestamp_millis()
    }
}

/// Upsert payload: every mutable user field. `created_at` is owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub is_channel_owner: bool,
    pub access_token: String,
    pub refresh_token: String,
    pub token_expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(expires_at: i64) -> User {
        User {
            id: "u1".into(),
            username: "alice".into(),
            is_channel_owner: false,
            access_token: "at".into(),
            refresh_token: "rt".into(),
            token_expires_at: expires_at,
            created_at: Utc.timestamp_millis_opt(0).unwrap(),
        }
    }

    #[test]
    fn token_expiry_boundary() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        assert!(!user(1_700_000_000_001).token_expired(now));
        assert!(user(1_700_000_000_000).token_expired(now));
        assert!(user(1_699_999_999_999).token_expired(now));
    }

    #[test]
    fn new_contribution_defaults_to_pending() {
        let c = NewContribution::new("alice", "main.ts", Some(10), "const x = 1");
        assert_eq!(c.status, ContributionStatus::Pending);

        let parsed: NewContribution = serde_json::from_str(
            r#"{"username":"bob","filename":"a.rs","line_number":null,"code":"x"}"#,
        )
        .unwrap();
        assert_eq!(parsed.status, ContributionStatus::Pending);
        assert_eq!(parsed.line_number, None);
    }
}
