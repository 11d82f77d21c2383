//! # Domain Module
//!
//! Business logic of the finance tracker: which transactions count toward a
//! month, what that month's balance is, and how the leftover balance is
//! distributed across savings goals.
//!
//! ## Module Organization
//!
//! - **models**: transactions, goals, contributions, settings and periods
//! - **visibility**: the rule deciding which months a transaction counts toward
//! - **aggregation**: monthly totals, balance and available balance
//! - **contribution_processor**: greedy, idempotent goal funding
//! - **finance_store**: owner of all collections and sole writer to storage
//! - **migration**: stored record conversion and legacy upcasting
//! - **export_service**: whole-dataset export and import
//! - **reprocess**: debounced background funding of the current month
//!
//! ## Business Rules
//!
//! - A recurring credit expense counts toward a window of consecutive months
//! - Balance is salary plus income minus expenses; contributions only reduce
//!   the available balance
//! - Goals are funded in creation order and at most once per month
//! - Deleting a goal deletes its contributions

pub mod aggregation;
pub mod commands;
pub mod contribution_processor;
pub mod error;
pub mod export_service;
pub mod finance_store;
pub mod migration;
pub mod models;
pub mod money;
pub mod reprocess;
pub mod visibility;

pub use aggregation::{MonthTotals, MonthlySummary};
pub use error::{FinanceError, FinanceResult, ImportError, RecordKind, ValidationError};
pub use export_service::ExportService;
pub use finance_store::FinanceStore;
pub use reprocess::{ReprocessHandle, Reprocessor};
