pub mod adapter;
pub mod clock;
pub mod dedup;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod translate;

pub use adapter::{Row, StorageAdapter};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{BackendError, Outcome, StoreError};
pub use translate::{Dialect, Translated};

use chrono::Duration;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed store. One owned connection, shared behind a mutex.
///
/// Opening only establishes the connection. Tables are created by
/// [`StorageAdapter::init`], which callers run once at startup.
pub struct Database {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
    dedup_window: Duration,
    similar_limit: usize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("Database opened at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            clock: Arc::new(SystemClock),
            dedup_window: Duration::minutes(dedup::DEFAULT_DEDUP_WINDOW_MINUTES),
            similar_limit: dedup::DEFAULT_SIMILAR_LIMIT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Overrides how far back, and how many, duplicate candidates are searched.
    pub fn with_dedup(mut self, window: Duration, limit: usize) -> Self {
        self.dedup_window = window;
        self.similar_limit = limit;
        self
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, BackendError>
    where
        F: FnOnce(&Connection) -> Result<T, BackendError>,
    {
        let conn = self.conn.lock().map_err(|_| BackendError::LockPoisoned)?;
        f(&conn)
    }
}
