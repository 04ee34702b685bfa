use rusqlite::Connection;
use tracing::info;

use crate::BackendError;

/// Creates the `contributions` and `users` tables if they are missing.
///
/// Safe to run any number of times, including from several processes at once.
pub fn run(conn: &Connection) -> Result<(), BackendError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS contributions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL,
            filename    TEXT NOT NULL,
            line_number INTEGER NULL,
            code        TEXT NOT NULL,
            status      TEXT DEFAULT 'pending',
            created_at  TEXT DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_contributions_author_file
            ON contributions(username, filename, created_at);

        CREATE TABLE IF NOT EXISTS users (
            id               TEXT PRIMARY KEY,
            username         TEXT UNIQUE NOT NULL,
            is_channel_owner BOOLEAN DEFAULT FALSE,
            access_token     TEXT NOT NULL,
            refresh_token    TEXT NOT NULL,
            token_expires_at INTEGER NOT NULL,
            created_at       TEXT DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
