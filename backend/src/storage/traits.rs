//! # Storage Traits
//!
//! The finance store persists every collection as a self-contained JSON blob
//! under a stable key. Any backend that can get and set strings by key can
//! hold the data, so the domain layer only depends on this trait.

use anyhow::Result;
use async_trait::async_trait;

/// Key-value persistence adapter
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
