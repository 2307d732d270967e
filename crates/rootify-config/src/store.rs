use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_db_path() -> PathBuf {
    PathBuf::from("rootify.db")
}

fn default_pool_size() -> u32 {
    4
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file holding the `word_roots` table
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Max pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl StoreConfig {
    pub fn new() -> Self {
        let db_path = env::var("ROOTIFY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let pool_size = env::var("ROOTIFY_POOL_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or_else(default_pool_size);

        let busy_timeout_ms = env::var("ROOTIFY_BUSY_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_busy_timeout_ms);

        Self {
            db_path,
            pool_size,
            busy_timeout_ms,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            pool_size: default_pool_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}
