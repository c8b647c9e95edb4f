use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Entries, StorageGateway};
use crate::error::{Result, SidenotesError};

/// In-process gateway.
///
/// Keeps every successful `set` batch in a write log so callers can see
/// exactly what was persisted and when, and can be told to reject the next
/// few writes.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, serde_json::Value>>,
    write_log: Mutex<Vec<Entries>>,
    failing_writes: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing values, as if loaded from an earlier session.
    pub fn with_entries(entries: Entries) -> Self {
        let storage = Self::default();
        if let Ok(mut values) = storage.values.lock() {
            values.extend(entries);
        }
        storage
    }

    /// Reject the next `count` calls to `set`.
    pub fn fail_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Every batch written so far, oldest first.
    pub fn write_log(&self) -> Vec<Entries> {
        self.write_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Current value for a key, if any.
    pub fn value(&self, key: &str) -> Option<serde_json::Value> {
        self.values.lock().ok()?.get(key).cloned()
    }
}

fn poisoned<T>(_: T) -> SidenotesError {
    SidenotesError::Storage("memory storage lock poisoned".to_string())
}

#[async_trait]
impl StorageGateway for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<Entries> {
        let values = self.values.lock().map_err(poisoned)?;
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: Entries) -> Result<()> {
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(SidenotesError::Storage("write rejected".to_string()));
        }

        let mut values = self.values.lock().map_err(poisoned)?;
        for (key, value) in &entries {
            values.insert(key.clone(), value.clone());
        }
        drop(values);

        self.write_log.lock().map_err(poisoned)?.push(entries);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_skips_missing_keys() {
        let storage = MemoryStorage::new();
        let mut entries = Entries::new();
        entries.insert("theme".to_string(), json!("dark"));
        storage.set(entries).await.unwrap();

        let got = storage.get(&["theme", "notes"]).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["theme"], json!("dark"));
    }

    #[tokio::test]
    async fn test_failed_write_is_not_logged() {
        let storage = MemoryStorage::new();
        storage.fail_writes(1);

        let mut entries = Entries::new();
        entries.insert("theme".to_string(), json!("dark"));
        assert!(storage.set(entries.clone()).await.is_err());
        assert!(storage.write_log().is_empty());
        assert_eq!(storage.value("theme"), None);

        storage.set(entries).await.unwrap();
        assert_eq!(storage.write_log().len(), 1);
    }
}
