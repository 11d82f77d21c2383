//! Runtime configuration for the server, read from environment variables.
//!
//! | Variable                       | Default             |
//! |--------------------------------|---------------------|
//! | `FINTRA_DATABASE_URL`          | `sqlite:fintra.db`  |
//! | `FINTRA_BIND_ADDR`             | `127.0.0.1:3000`    |
//! | `FINTRA_REPROCESS_DEBOUNCE_MS` | `1500`              |

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use crate::storage::sqlite::DEFAULT_DATABASE_URL;

pub const DATABASE_URL_VAR: &str = "FINTRA_DATABASE_URL";
pub const BIND_ADDR_VAR: &str = "FINTRA_BIND_ADDR";
pub const REPROCESS_DEBOUNCE_VAR: &str = "FINTRA_REPROCESS_DEBOUNCE_MS";

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);
const DEFAULT_DEBOUNCE_MS: u64 = 1500;

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Quiet period after the last mutation before goals are reprocessed
    pub reprocess_debounce: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            reprocess_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source; unset variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(DATABASE_URL_VAR) {
            config.database_url = url;
        }
        if let Some(addr) = lookup(BIND_ADDR_VAR) {
            config.bind_addr = addr
                .parse()
                .with_context(|| format!("{} is not a socket address: {}", BIND_ADDR_VAR, addr))?;
        }
        if let Some(ms) = lookup(REPROCESS_DEBOUNCE_VAR) {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("{} is not a number of milliseconds: {}", REPROCESS_DEBOUNCE_VAR, ms))?;
            config.reprocess_debounce = Duration::from_millis(ms);
        }

        Ok(config)
    }
}
