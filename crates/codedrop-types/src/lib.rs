pub mod models;
pub mod status;

pub use models::{Contribution, NewContribution, NewUser, User};
pub use status::{ContributionStatus, UnknownStatus};
