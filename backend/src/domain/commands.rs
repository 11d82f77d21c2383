//! Domain-level command and result types.
//! These structs are used by the finance store and are **not** exposed over
//! the public API. The REST layer maps the DTOs from the `shared` crate to
//! these types.

pub mod transactions {
    use chrono::NaiveDate;
    use shared::{TransactionCategory, TransactionType};

    /// Input for creating or replacing a transaction.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub description: String,
        pub amount: f64,
        /// Registration date; today when absent
        pub date: Option<NaiveDate>,
        pub category: TransactionCategory,
        pub transaction_type: TransactionType,
        pub is_recurring: bool,
        pub due_day: Option<u32>,
        pub recurring_months: Option<u32>,
        pub start_month: Option<u32>,
        pub start_year: Option<i32>,
    }

    /// Replace every field of an existing transaction.
    #[derive(Debug, Clone)]
    pub struct UpdateTransactionCommand {
        pub transaction_id: String,
        pub fields: CreateTransactionCommand,
    }
}

pub mod goals {
    use crate::domain::models::ContributionPolicy;

    #[derive(Debug, Clone)]
    pub struct CreateGoalCommand {
        pub name: String,
        pub total_target: f64,
        pub policy: ContributionPolicy,
        pub is_active: bool,
    }

    /// Edit a goal's definition. The accumulated amount and creation time
    /// are kept from the stored goal.
    #[derive(Debug, Clone)]
    pub struct UpdateGoalCommand {
        pub goal_id: String,
        pub name: String,
        pub total_target: f64,
        pub policy: ContributionPolicy,
        pub is_active: bool,
    }

    /// Result of deleting a goal.
    #[derive(Debug, Clone)]
    pub struct DeleteGoalResult {
        pub goal_id: String,
        pub removed_contributions: usize,
        pub success_message: String,
    }
}

pub mod contributions {
    use crate::domain::models::{DomainContribution, Period};

    /// Result of processing a month's goal contributions.
    #[derive(Debug, Clone)]
    pub struct ProcessMonthResult {
        pub period: Period,
        /// Contributions created by this run
        pub created: Vec<DomainContribution>,
        /// Available balance after the run
        pub available_balance: f64,
    }
}

pub mod settings {
    #[derive(Debug, Clone)]
    pub struct UpdateSettingsCommand {
        pub goal_contribution_day: u32,
    }
}

pub mod import {
    use crate::domain::models::{DomainContribution, DomainGoal, DomainTransaction};

    /// A validated snapshot that replaces everything in the store.
    #[derive(Debug, Clone, Default)]
    pub struct ReplaceAllCommand {
        pub salary: f64,
        pub transactions: Vec<DomainTransaction>,
        pub goals: Vec<DomainGoal>,
        pub contributions: Vec<DomainContribution>,
    }

    /// Result of importing a document.
    #[derive(Debug, Clone)]
    pub struct ImportResult {
        pub transaction_count: usize,
        pub goal_count: usize,
        pub contribution_count: usize,
        pub success_message: String,
    }
}
