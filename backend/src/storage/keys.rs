//! Stable storage keys, one per collection.

pub const SALARY_KEY: &str = "@Fintra:salary";
pub const TRANSACTIONS_KEY: &str = "@Fintra:transactions";
pub const GOALS_KEY: &str = "@Fintra:goals";
pub const CONTRIBUTIONS_KEY: &str = "@Fintra:goalContributions";
pub const SETTINGS_KEY: &str = "@Fintra:settings";

/// Expense-only collection written before income transactions existed.
/// Read once on load when `TRANSACTIONS_KEY` is absent.
pub const LEGACY_EXPENSES_KEY: &str = "@Fintra:expenses";
