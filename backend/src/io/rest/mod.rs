//! # REST API Interface Layer
//!
//! JSON-over-HTTP surface for the finance store. Handlers translate DTOs
//! from the `shared` crate into domain commands, lock the store, and map
//! domain errors to status codes (see `error`). Mutating endpoints nudge
//! the background reprocessor afterwards.

pub mod contribution_apis;
pub mod error;
pub mod export_apis;
pub mod goal_apis;
pub mod mappers;
pub mod summary_apis;
pub mod transaction_apis;
