use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Review state of a contribution.
///
/// `Pending` is the only state a contribution is created in. `Accepted` and
/// `Rejected` are terminal: once a reviewer has decided, the status is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ContributionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Whether a reviewer may move a contribution from `self` to `next`.
    ///
    /// Only `pending -> accepted` and `pending -> rejected` exist.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Pending && next.is_terminal()
    }
}

impl fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contribution status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ContributionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_moves() {
        use ContributionStatus::*;

        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));

        for terminal in [Accepted, Rejected] {
            for next in [Pending, Accepted, Rejected] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn parses_wire_strings() {
        assert_eq!("accepted".parse(), Ok(ContributionStatus::Accepted));
        assert_eq!(
            "Accepted".parse::<ContributionStatus>(),
            Err(UnknownStatus("Accepted".into()))
        );
        assert_eq!(ContributionStatus::default().to_string(), "pending");
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ContributionStatus::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
    }
}
