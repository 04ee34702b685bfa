//! Contribution repository: the operations the route layer calls.
//!
//! Every call runs the synchronous storage adapter on the blocking pool and
//! returns a fresh snapshot; nothing is cached here. Callers that need a
//! latency bound wrap calls in `tokio::time::timeout` themselves.
//!
//! The duplicate check in [`Repository::submit`] and the status check in
//! [`Repository::update_status`] are separate statements from the write that
//! follows. Two concurrent submissions can both pass the check and both
//! insert; two concurrent reviews can both see `pending`.

pub mod error;
pub mod queue;

pub use error::{ReviewError, SubmitError};
pub use queue::ReviewQueue;

use std::sync::Arc;

use codedrop_db::dedup::normalize;
use codedrop_db::{BackendError, Clock, Outcome, Row, StorageAdapter, StoreError, SystemClock};
use codedrop_types::{Contribution, ContributionStatus, NewContribution, NewUser, User};
use serde_json::Value;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn StorageAdapter>,
    clock: Arc<dyn Clock>,
}

impl Repository {
    pub fn new(store: Arc<dyn StorageAdapter>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Clock used for token expiry checks. Share it with the store in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // -- Contributions --

    pub async fn init(&self) -> Outcome<()> {
        self.absorbing(StoreError::Init, |store| store.init()).await
    }

    pub async fn get_contributions(&self) -> Outcome<Vec<Contribution>> {
        self.read(|store| store.get_contributions()).await
    }

    pub async fn get_contribution(&self, id: i64) -> Outcome<Option<Contribution>> {
        self.read(move |store| store.get_contribution(id)).await
    }

    pub async fn review_queue(&self) -> Outcome<ReviewQueue> {
        self.get_contributions()
            .await
            .map(ReviewQueue::from_contributions)
    }

    /// Inserts without a duplicate check. See [`Repository::submit`].
    ///
    /// New contributions always start `pending`; any other status on `new`
    /// is overwritten.
    pub async fn create_contribution(&self, mut new: NewContribution) -> Result<i64, StoreError> {
        if new.status != ContributionStatus::Pending {
            warn!(
                "Ignoring initial status {} from {}, storing as pending",
                new.status, new.username
            );
            new.status = ContributionStatus::Pending;
        }
        self.write(move |store| store.create_contribution(&new)).await
    }

    /// Recent contributions from the same user and file whose code starts
    /// with `code` once both are normalized. Newest first, capped by the store.
    pub async fn get_similar_contributions(
        &self,
        username: &str,
        filename: &str,
        code: &str,
    ) -> Outcome<Vec<Contribution>> {
        let username = username.to_string();
        let filename = filename.to_string();
        let normalized = normalize(code);
        self.read(move |store| store.get_similar_contributions(&username, &filename, &normalized))
            .await
    }

    /// A failed lookup counts as "no duplicate".
    pub async fn is_duplicate(&self, username: &str, filename: &str, code: &str) -> bool {
        !self
            .get_similar_contributions(username, filename, code)
            .await
            .into_value()
            .is_empty()
    }

    /// Duplicate-checked insert.
    ///
    /// If the duplicate lookup itself fails, the submission goes through.
    pub async fn submit(&self, new: NewContribution) -> Result<i64, SubmitError> {
        let (similar, lookup_error) = self
            .get_similar_contributions(&new.username, &new.filename, &new.code)
            .await
            .into_parts();

        if let Some(e) = lookup_error {
            warn!("Duplicate check unavailable, accepting submission: {}", e);
        }

        if !similar.is_empty() {
            info!(
                "Rejecting duplicate submission from {} on {} ({} match(es))",
                new.username,
                new.filename,
                similar.len()
            );
            return Err(SubmitError::Duplicate(similar));
        }

        Ok(self.create_contribution(new).await?)
    }

    /// Reviewer decision. Only `pending -> accepted` and `pending -> rejected`
    /// are allowed; everything else is rejected without touching the store.
    pub async fn update_status(
        &self,
        id: i64,
        status: ContributionStatus,
    ) -> Result<(), ReviewError> {
        let current = match self.get_contribution(id).await {
            Outcome::Fresh(Some(contribution)) => contribution.status,
            Outcome::Fresh(None) => return Err(ReviewError::NotFound(id)),
            Outcome::Degraded { error, .. } => return Err(error.into()),
        };

        if !current.can_transition_to(status) {
            return Err(if current.is_terminal() {
                ReviewError::AlreadyReviewed {
                    id,
                    status: current,
                }
            } else {
                ReviewError::InvalidTarget(status)
            });
        }

        let (_, failure) = self
            .absorbing(StoreError::Write, move |store| store.update_status(id, status))
            .await
            .into_parts();
        match failure {
            Some(e) => Err(e.into()),
            None => {
                info!("Contribution {} {}", id, status);
                Ok(())
            }
        }
    }

    pub async fn accept(&self, id: i64) -> Result<(), ReviewError> {
        self.update_status(id, ContributionStatus::Accepted).await
    }

    pub async fn reject(&self, id: i64) -> Result<(), ReviewError> {
        self.update_status(id, ContributionStatus::Rejected).await
    }

    // -- Users --

    pub async fn create_or_update_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.write(move |store| store.create_or_update_user(&user)).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Outcome<Option<User>> {
        let username = username.to_string();
        self.read(move |store| store.get_user_by_username(&username))
            .await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Outcome<Option<User>> {
        let id = id.to_string();
        self.read(move |store| store.get_user_by_id(&id)).await
    }

    /// Whether `username` is known and holds an unexpired access token.
    pub async fn has_valid_token(&self, username: &str) -> bool {
        let now = self.clock.now();
        self.get_user_by_username(username)
            .await
            .into_value()
            .is_some_and(|user| !user.token_expired(now))
    }

    // -- Raw --

    pub async fn query(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, StoreError> {
        let sql = sql.to_string();
        self.write(move |store| store.query(&sql, params)).await
    }

    // -- Blocking bridge --

    async fn read<T, F>(&self, f: F) -> Outcome<T>
    where
        T: Default + Send + 'static,
        F: FnOnce(&dyn StorageAdapter) -> Outcome<T> + Send + 'static,
    {
        self.absorbing(StoreError::Read, f).await
    }

    /// Like `read`, with a join failure reported as `kind`.
    async fn absorbing<T, F>(&self, kind: fn(BackendError) -> StoreError, f: F) -> Outcome<T>
    where
        T: Default + Send + 'static,
        F: FnOnce(&dyn StorageAdapter) -> Outcome<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || f(store.as_ref())).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("spawn_blocking join error: {}", e);
                Outcome::Degraded {
                    value: T::default(),
                    error: kind(BackendError::Join(e.to_string())),
                }
            }
        }
    }

    async fn write<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn StorageAdapter) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                StoreError::Write(BackendError::Join(e.to_string()))
            })?
    }
}
