use codedrop_types::Contribution;
use serde::Serialize;

/// Contributions split the way a reviewer works through them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewQueue {
    pub pending: Vec<Contribution>,
    /// Accepted and rejected contributions.
    pub reviewed: Vec<Contribution>,
}

impl ReviewQueue {
    /// Keeps the input order within each half.
    pub fn from_contributions(contributions: Vec<Contribution>) -> Self {
        let (reviewed, pending) = contributions
            .into_iter()
            .partition(|c| c.status.is_terminal());
        Self { pending, reviewed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use codedrop_types::ContributionStatus;

    fn contribution(id: i64, status: ContributionStatus) -> Contribution {
        Contribution {
            id,
            username: "alice".into(),
            filename: "main.ts".into(),
            line_number: None,
            code: "x".into(),
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn splits_by_terminal_state() {
        use ContributionStatus::*;

        let queue = ReviewQueue::from_contributions(vec![
            contribution(4, Pending),
            contribution(3, Rejected),
            contribution(2, Pending),
            contribution(1, Accepted),
        ]);

        let pending: Vec<i64> = queue.pending.iter().map(|c| c.id).collect();
        let reviewed: Vec<i64> = queue.reviewed.iter().map(|c| c.id).collect();
        assert_eq!(pending, vec![4, 2]);
        assert_eq!(reviewed, vec![3, 1]);
    }
}
