use chrono::{DateTime, Utc};
use shared::ContributionType;
use uuid::Uuid;

use crate::domain::error::ValidationError;
use crate::domain::money::round_cents;

pub const MAX_GOAL_NAME_LEN: usize = 100;

/// How much a goal asks for each month
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContributionPolicy {
    /// A fixed amount per month
    Fixed(f64),
    /// A percentage (0-100] of the month's remaining available balance
    Percentage(f64),
}

impl ContributionPolicy {
    pub fn from_parts(
        contribution_type: ContributionType,
        value: f64,
    ) -> Self {
        match contribution_type {
            ContributionType::Fixed => ContributionPolicy::Fixed(value),
            ContributionType::Percentage => ContributionPolicy::Percentage(value),
        }
    }

    pub fn contribution_type(&self) -> ContributionType {
        match self {
            ContributionPolicy::Fixed(_) => ContributionType::Fixed,
            ContributionPolicy::Percentage(_) => ContributionType::Percentage,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            ContributionPolicy::Fixed(amount) => *amount,
            ContributionPolicy::Percentage(pct) => *pct,
        }
    }

    /// Amount requested given what is still available this month
    pub fn amount_for(&self, remaining: f64) -> f64 {
        match self {
            ContributionPolicy::Fixed(amount) => *amount,
            ContributionPolicy::Percentage(pct) => round_cents(remaining * pct / 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DomainGoal {
    pub id: String,
    pub name: String,
    pub total_target: f64,
    pub policy: ContributionPolicy,
    /// Sum of all contributions made to this goal
    pub current_amount: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DomainGoal {
    pub fn generate_id() -> String {
        format!("goal::{}", Uuid::new_v4())
    }

    /// What is left to reach the target, never negative
    pub fn outstanding(&self) -> f64 {
        (self.total_target - self.current_amount).max(0.0)
    }

    pub fn is_funded(&self) -> bool {
        self.outstanding() <= 0.0
    }

    /// The policy's request for this month, capped at the outstanding amount
    pub fn nominal_ask(&self, remaining: f64) -> f64 {
        round_cents(self.policy.amount_for(remaining).min(self.outstanding()))
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_target <= 0.0 {
            return 0.0;
        }
        (self.current_amount / self.total_target * 100.0).min(100.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_goal_fields(&self.name, self.total_target, &self.policy)?;
        if !self.current_amount.is_finite() || self.current_amount < 0.0 {
            return Err(ValidationError::NegativeAccumulatedAmount);
        }
        Ok(())
    }
}

pub fn validate_goal_fields(
    name: &str,
    total_target: f64,
    policy: &ContributionPolicy,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyGoalName);
    }
    if name.chars().count() > MAX_GOAL_NAME_LEN {
        return Err(ValidationError::GoalNameTooLong {
            max: MAX_GOAL_NAME_LEN,
        });
    }
    if !total_target.is_finite() || total_target <= 0.0 {
        return Err(ValidationError::NonPositiveTarget);
    }
    match *policy {
        ContributionPolicy::Fixed(amount) => {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(ValidationError::NonPositiveContribution);
            }
            if amount > total_target {
                return Err(ValidationError::ContributionAboveTarget);
            }
        }
        ContributionPolicy::Percentage(pct) => {
            if !pct.is_finite() || pct <= 0.0 || pct > 100.0 {
                return Err(ValidationError::PercentageOutOfRange(pct));
            }
        }
    }
    Ok(())
}
