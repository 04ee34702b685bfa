//! The storage contract every backend implements.
//!
//! Reads absorb their failures: they log, substitute an empty or absent value
//! and report it through [`Outcome::Degraded`]. Writes return `Err` so the
//! caller can report and retry. `init` and `update_status` absorb like reads.

use codedrop_types::{Contribution, ContributionStatus, NewContribution, NewUser, User};
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use crate::{BackendError, Database, Outcome, StoreError};

/// One row from a raw query, keyed by column name.
pub type Row = Map<String, Value>;

pub trait StorageAdapter: Send + Sync {
    /// Ensures the schema exists. Safe to call repeatedly and concurrently.
    fn init(&self) -> Outcome<()>;

    /// All contributions, newest first.
    fn get_contributions(&self) -> Outcome<Vec<Contribution>>;

    fn get_contribution(&self, id: i64) -> Outcome<Option<Contribution>>;

    /// Sets the status unconditionally. Transition rules live above this layer.
    fn update_status(&self, id: i64, status: ContributionStatus) -> Outcome<()>;

    /// Inserts and returns the assigned id.
    fn create_contribution(&self, new: &NewContribution) -> Result<i64, StoreError>;

    /// Recent contributions from the same user and file whose code matches
    /// `normalized_code`, newest first and capped at the configured limit.
    fn get_similar_contributions(
        &self,
        username: &str,
        filename: &str,
        normalized_code: &str,
    ) -> Outcome<Vec<Contribution>>;

    /// Inserts the user, or overwrites every mutable field if the id exists.
    fn create_or_update_user(&self, user: &NewUser) -> Result<User, StoreError>;

    fn get_user_by_username(&self, username: &str) -> Outcome<Option<User>>;

    fn get_user_by_id(&self, id: &str) -> Outcome<Option<User>>;

    /// Escape hatch for ad-hoc statements using `?` placeholders.
    fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, StoreError>;
}

fn absorb<T>(
    what: &str,
    result: Result<T, BackendError>,
    fallback: T,
    kind: fn(BackendError) -> StoreError,
) -> Outcome<T> {
    match result {
        Ok(value) => Outcome::Fresh(value),
        Err(e) => {
            let error = kind(e);
            error!("Error {}: {}", what, error);
            Outcome::Degraded {
                value: fallback,
                error,
            }
        }
    }
}

fn read<T>(what: &str, result: Result<T, BackendError>, fallback: T) -> Outcome<T> {
    absorb(what, result, fallback, StoreError::Read)
}

fn write<T>(what: &str, result: Result<T, BackendError>) -> Result<T, StoreError> {
    result.map_err(|e| {
        let error = StoreError::Write(e);
        error!("Error {}: {}", what, error);
        error
    })
}

impl StorageAdapter for Database {
    fn init(&self) -> Outcome<()> {
        absorb("initializing tables", self.run_migrations(), (), StoreError::Init)
    }

    fn get_contributions(&self) -> Outcome<Vec<Contribution>> {
        read("fetching contributions", self.list_contributions(), vec![])
    }

    fn get_contribution(&self, id: i64) -> Outcome<Option<Contribution>> {
        read("fetching contribution", self.find_contribution(id), None)
    }

    fn update_status(&self, id: i64, status: ContributionStatus) -> Outcome<()> {
        absorb(
            "updating status",
            self.set_status(id, status),
            (),
            StoreError::Write,
        )
    }

    fn create_contribution(&self, new: &NewContribution) -> Result<i64, StoreError> {
        debug!("Creating contribution for {} on {}", new.username, new.filename);
        let id = write("creating contribution", self.insert_contribution(new))?;
        info!("Contribution saved, id {}", id);
        Ok(id)
    }

    fn get_similar_contributions(
        &self,
        username: &str,
        filename: &str,
        normalized_code: &str,
    ) -> Outcome<Vec<Contribution>> {
        read(
            "checking similar contributions",
            self.find_similar(username, filename, normalized_code),
            vec![],
        )
    }

    fn create_or_update_user(&self, user: &NewUser) -> Result<User, StoreError> {
        write("saving user", self.upsert_user(user))
    }

    fn get_user_by_username(&self, username: &str) -> Outcome<Option<User>> {
        read("fetching user", self.find_user_by_username(username), None)
    }

    fn get_user_by_id(&self, id: &str) -> Outcome<Option<User>> {
        read("fetching user", self.find_user_by_id(id), None)
    }

    fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, StoreError> {
        write(&format!("running query {sql:?}"), self.run_raw(sql, params))
    }
}
