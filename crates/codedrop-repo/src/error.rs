use codedrop_db::StoreError;
use codedrop_types::{Contribution, ContributionStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("contribution {0} not found")]
    NotFound(i64),

    #[error("contribution {id} was already {status}")]
    AlreadyReviewed { id: i64, status: ContributionStatus },

    #[error("a contribution cannot be moved to {0}")]
    InvalidTarget(ContributionStatus),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    /// Matching contributions from the same user and file, newest first.
    #[error("{} similar contribution(s) were submitted recently", .0.len())]
    Duplicate(Vec<Contribution>),

    #[error(transparent)]
    Store(#[from] StoreError),
}
