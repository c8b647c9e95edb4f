use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persist::RetryPolicy;

const CONFIG_FILE: &str = "config.json";

/// Tuning for the sidebar's persistence behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Quiet period after the last content edit before it is written.
    pub debounce_ms: u64,
    /// Extra attempts for a rejected write.
    pub write_retries: u32,
    /// Pause between write attempts.
    pub retry_backoff_ms: u64,
    /// Write a still-pending content edit when the sidebar closes instead of
    /// dropping it.
    pub flush_on_close: bool,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            write_retries: 2,
            retry_backoff_ms: 50,
            flush_on_close: false,
        }
    }
}

impl SidebarConfig {
    /// Read `config.json` from `dir`, or fall back to defaults when the file
    /// does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            retries: self.write_retries,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}
