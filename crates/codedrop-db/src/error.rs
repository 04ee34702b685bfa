use thiserror::Error;

/// What actually went wrong underneath a store operation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection lock poisoned")]
    LockPoisoned,

    #[error("query has {placeholders} placeholders but {params} parameters were supplied")]
    ParamCount { placeholders: usize, params: usize },

    #[error("malformed timestamp {0:?}")]
    Timestamp(String),

    #[error(transparent)]
    Status(#[from] codedrop_types::UnknownStatus),

    #[error("blocking task failed: {0}")]
    Join(String),
}

/// Store failures, split by the path they happened on.
///
/// `Init` and `Read` are logged and absorbed by the adapter; they only ever
/// reach callers inside [`Outcome::Degraded`]. `Write` is returned as `Err`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("schema bootstrap failed: {0}")]
    Init(#[source] BackendError),

    #[error("read failed: {0}")]
    Read(#[source] BackendError),

    #[error("write failed: {0}")]
    Write(#[source] BackendError),
}

/// Result of an operation whose failures are absorbed instead of returned.
///
/// A degraded outcome still carries a usable value (empty list, `None`, `()`)
/// alongside the error that caused the fallback.
#[must_use]
#[derive(Debug)]
pub enum Outcome<T> {
    Fresh(T),
    Degraded { value: T, error: StoreError },
}

impl<T> Outcome<T> {
    pub fn into_value(self) -> T {
        match self {
            Self::Fresh(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Fresh(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::Fresh(_) => None,
            Self::Degraded { error, .. } => Some(error),
        }
    }

    /// Splits into the value and, if degraded, the error.
    pub fn into_parts(self) -> (T, Option<StoreError>) {
        match self {
            Self::Fresh(value) => (value, None),
            Self::Degraded { value, error } => (value, Some(error)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Fresh(value) => Outcome::Fresh(f(value)),
            Self::Degraded { value, error } => Outcome::Degraded { value: f(value), error },
        }
    }
}
