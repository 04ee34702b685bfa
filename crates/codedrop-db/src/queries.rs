use chrono::{DateTime, Utc};
use codedrop_types::{Contribution, ContributionStatus, NewContribution, NewUser, User};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, OptionalExtension};
use serde_json::{Map, Number, Value};
use tracing::warn;

use crate::models::{ContributionRow, UserRow, format_timestamp};
use crate::translate::{Dialect, translate};
use crate::{BackendError, Database, dedup};

impl Database {
    // -- Schema --

    pub fn run_migrations(&self) -> Result<(), BackendError> {
        self.with_conn(crate::migrations::run)
    }

    // -- Contributions --

    pub fn insert_contribution(&self, new: &NewContribution) -> Result<i64, BackendError> {
        let created_at = format_timestamp(self.clock.now());
        self.with_conn(|conn| {
            let id = conn.query_row(
                "INSERT INTO contributions (username, filename, line_number, code, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING id",
                rusqlite::params![
                    new.username,
                    new.filename,
                    new.line_number,
                    new.code,
                    new.status.as_str(),
                    created_at,
                ],
                |row| row.get(0),
            )?;
            Ok(id)
        })
    }

    pub fn list_contributions(&self) -> Result<Vec<Contribution>, BackendError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM contributions ORDER BY created_at DESC, id DESC",
                ContributionRow::COLUMNS
            );
            query_contributions(conn, &sql, rusqlite::params![])
        })
    }

    pub fn find_contribution(&self, id: i64) -> Result<Option<Contribution>, BackendError> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM contributions WHERE id = ?1",
                ContributionRow::COLUMNS
            );
            let row = conn
                .query_row(&sql, [id], ContributionRow::from_row)
                .optional()?;
            row.map(Contribution::try_from).transpose()
        })
    }

    pub fn set_status(&self, id: i64, status: ContributionStatus) -> Result<(), BackendError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE contributions SET status = ?1 WHERE id = ?2",
                rusqlite::params![status.as_str(), id],
            )?;
            Ok(())
        })
    }

    /// Same user, same file, inside the dedup window, matching code. Newest first.
    pub fn find_similar(
        &self,
        username: &str,
        filename: &str,
        normalized_code: &str,
    ) -> Result<Vec<Contribution>, BackendError> {
        let since = format_timestamp(self.window_start());
        let recent = self.with_conn(|conn| {
            let sql = format!(
                "SELECT {} FROM contributions
                 WHERE username = ?1 AND filename = ?2 AND created_at > ?3
                 ORDER BY created_at DESC, id DESC",
                ContributionRow::COLUMNS
            );
            query_contributions(conn, &sql, rusqlite::params![username, filename, since])
        })?;

        Ok(recent
            .into_iter()
            .filter(|c| dedup::is_similar(normalized_code, &c.code))
            .take(self.similar_limit)
            .collect())
    }

    fn window_start(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        now.checked_sub_signed(self.dedup_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    // -- Users --

    pub fn upsert_user(&self, user: &NewUser) -> Result<User, BackendError> {
        let created_at = format_timestamp(self.clock.now());
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO users (id, username, is_channel_owner, access_token, refresh_token, token_expires_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT (id) DO UPDATE SET
                     username = excluded.username,
                     is_channel_owner = excluded.is_channel_owner,
                     access_token = excluded.access_token,
                     refresh_token = excluded.refresh_token,
                     token_expires_at = excluded.token_expires_at
                 RETURNING {}",
                UserRow::COLUMNS
            );
            let row = conn.query_row(
                &sql,
                rusqlite::params![
                    user.id,
                    user.username,
                    user.is_channel_owner,
                    user.access_token,
                    user.refresh_token,
                    user.token_expires_at,
                    created_at,
                ],
                UserRow::from_row,
            )?;
            User::try_from(row)
        })
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, BackendError> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn find_user_by_id(&self, id: &str) -> Result<Option<User>, BackendError> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Raw --

    /// Runs an ad-hoc statement written with `?` placeholders.
    ///
    /// Statements that produce rows return them as JSON objects keyed by
    /// column name; anything else returns an empty list.
    pub fn run_raw(
        &self,
        template: &str,
        params: Vec<Value>,
    ) -> Result<Vec<Map<String, Value>>, BackendError> {
        let translated = translate(Dialect::Sqlite, template, params)?;
        let bound: Vec<SqlValue> = translated.params.iter().map(json_to_sql).collect();

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&translated.sql)?;
            let params = rusqlite::params_from_iter(bound.iter());

            if stmt.column_count() == 0 {
                stmt.execute(params)?;
                return Ok(vec![]);
            }

            let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let mut rows = stmt.query(params)?;
            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                let mut object = Map::with_capacity(names.len());
                for (i, name) in names.iter().enumerate() {
                    object.insert(name.clone(), sql_to_json(row.get_ref(i)?));
                }
                out.push(object);
            }
            Ok(out)
        })
    }
}

fn query_contributions<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Contribution>, BackendError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let id: i64 = row.get(0)?;
        let decoded = ContributionRow::from_row(row)
            .map_err(BackendError::from)
            .and_then(Contribution::try_from);
        match decoded {
            Ok(contribution) => out.push(contribution),
            // one bad row must not hide the rest
            Err(e) => warn!("Skipping unreadable contribution {}: {}", id, e),
        }
    }
    Ok(out)
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>, BackendError> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?1", UserRow::COLUMNS, column);
    let row = conn.query_row(&sql, [value], UserRow::from_row).optional()?;
    row.map(User::try_from).transpose()
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map(SqlValue::Real).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        // nested values are stored as their JSON text
        other => SqlValue::Text(other.to_string()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b.to_vec()),
    }
}
