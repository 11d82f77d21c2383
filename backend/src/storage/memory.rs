//! In-process key-value store.
//!
//! Used by tests and by callers that do not need durability. Writes can be
//! made to fail on demand so callers can exercise their error paths.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::traits::KeyValueStore;

/// Cloneable handle to a shared in-memory map
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
    failing_key: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set` fail until switched back off
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make writes to one key fail while other keys keep working
    pub fn set_failing_key(&self, key: Option<&str>) {
        if let Ok(mut failing) = self.failing_key.lock() {
            *failing = key.map(str::to_string);
        }
    }

    fn rejects(&self, key: &str) -> bool {
        if self.fail_writes.load(Ordering::SeqCst) {
            return true;
        }
        self.failing_key
            .lock()
            .map(|failing| failing.as_deref() == Some(key))
            .unwrap_or(false)
    }

    /// Read a value without going through the async trait
    pub fn raw(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .ok()
            .and_then(|values| values.get(key).cloned())
    }

    /// Seed a value directly, bypassing failure injection
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.rejects(key) {
            return Err(anyhow!("write to {} rejected", key));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        debug!("Stored {} bytes under {}", value.len(), key);
        Ok(())
    }
}
