//! # Storage Module
//!
//! Persistence for the finance store. Every collection (salary, transactions,
//! goals, contributions, settings) is serialized independently to JSON and
//! kept under its own key, so any key-value backend can hold the data.
//!
//! - **traits**: the `KeyValueStore` adapter contract
//! - **keys**: stable key names, including the legacy expense key
//! - **memory**: in-process store for tests and ephemeral use
//! - **sqlite**: durable store backed by a single SQLite table

pub mod keys;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::KeyValueStore;
