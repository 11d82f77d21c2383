//! Errors surfaced by the finance domain.
//!
//! Storage adapters report failures as `anyhow::Error`; the store wraps them
//! in `FinanceError::Persistence` so callers can tell a rejected command
//! apart from a failed write.

use std::fmt;

/// Kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Transaction,
    Goal,
    Contribution,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Transaction => write!(f, "Transaction"),
            RecordKind::Goal => write!(f, "Goal"),
            RecordKind::Contribution => write!(f, "Contribution"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Description cannot be empty")]
    EmptyDescription,
    #[error("Description is too long (max {max} characters)")]
    DescriptionTooLong { max: usize },
    #[error("Amount must be a positive number")]
    NonPositiveAmount,
    #[error("Recurring credit transactions need a due day")]
    MissingDueDay,
    #[error("Due day must be between 1 and 31, got {0}")]
    DueDayOutOfRange(u32),
    #[error("Recurring credit transactions need a number of months")]
    MissingRecurringMonths,
    #[error("Recurring months must be at least 1")]
    RecurringMonthsTooSmall,
    #[error("Start month must be between 1 and 12, got {0}")]
    StartMonthOutOfRange(u32),
    #[error("Category {category} cannot be paired with type {transaction_type}")]
    CategoryTypeMismatch {
        category: String,
        transaction_type: String,
    },
    #[error("Only credit transactions can be recurring")]
    RecurrenceOnNonCredit,
    #[error("Salary must be zero or a positive number")]
    NegativeSalary,
    #[error("Goal name cannot be empty")]
    EmptyGoalName,
    #[error("Goal name is too long (max {max} characters)")]
    GoalNameTooLong { max: usize },
    #[error("Goal target must be a positive number")]
    NonPositiveTarget,
    #[error("Goal has no contribution policy")]
    MissingContributionPolicy,
    #[error("Monthly contribution must be a positive number")]
    NonPositiveContribution,
    #[error("Monthly contribution cannot be greater than the goal target")]
    ContributionAboveTarget,
    #[error("Contribution percentage must be greater than 0 and at most 100, got {0}")]
    PercentageOutOfRange(f64),
    #[error("Accumulated amount must be zero or a positive number")]
    NegativeAccumulatedAmount,
    #[error("Contribution amount must be zero or a positive number")]
    NegativeContributionAmount,
    #[error("Contribution day must be between 1 and 31, got {0}")]
    ContributionDayOutOfRange(u32),
    #[error("Month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
    #[error("Year out of range: {0}")]
    YearOutOfRange(i32),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    MalformedJson(String),
    #[error("The file does not contain salary, transactions, goals or contributions")]
    MissingData,
    #[error("Salary is invalid: {0}")]
    InvalidSalary(ValidationError),
    #[error("{kind} {id} is invalid: {reason}")]
    InvalidRecord {
        kind: RecordKind,
        id: String,
        reason: ValidationError,
    },
    #[error("{kind} id {id} appears more than once")]
    DuplicateId { kind: RecordKind, id: String },
    #[error("Goal {goal_id} has more than one contribution for {month:02}/{year}")]
    DuplicateContribution {
        goal_id: String,
        month: u32,
        year: i32,
    },
    #[error("Contribution {contribution_id} refers to unknown goal {goal_id}")]
    UnknownGoal {
        contribution_id: String,
        goal_id: String,
    },
    #[error("Goal {goal_id} has accumulated {current_amount:.2} but its contributions sum to {contributed:.2}")]
    AccumulatorMismatch {
        goal_id: String,
        current_amount: f64,
        contributed: f64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    #[error("Import replaces all existing data and must be confirmed")]
    ConfirmationRequired,
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("Failed to persist data: {0:#}")]
    Persistence(anyhow::Error),
}

impl FinanceError {
    pub fn not_found(kind: RecordKind, id: &str) -> Self {
        FinanceError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type FinanceResult<T> = Result<T, FinanceError>;
