use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::period::Period;

/// One month's allocation from the available balance to a goal
#[derive(Debug, Clone, PartialEq)]
pub struct DomainContribution {
    pub id: String,
    pub goal_id: String,
    pub amount: f64,
    pub period: Period,
    /// True when the goal received its full nominal ask
    pub is_complete: bool,
    /// When the contribution was processed
    pub date: DateTime<Utc>,
}

impl DomainContribution {
    pub fn generate_id() -> String {
        format!("contribution::{}", Uuid::new_v4())
    }

    pub fn is_for(&self, goal_id: &str, period: Period) -> bool {
        self.goal_id == goal_id && self.period == period
    }
}
