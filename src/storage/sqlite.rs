use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use super::{Entries, StorageGateway};
use crate::error::{Result, SidenotesError};

const NOTES_DB: &str = "notes.db";

/// SQLite-backed gateway: one `kv` table, values stored as JSON text.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteStorage {
    /// Open or create the database inside `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(NOTES_DB);
        let conn = Connection::open(&path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn poisoned<T>(_: T) -> SidenotesError {
    SidenotesError::Storage("sqlite connection lock poisoned".to_string())
}

#[async_trait]
impl StorageGateway for SqliteStorage {
    async fn get(&self, keys: &[&str]) -> Result<Entries> {
        let conn = Arc::clone(&self.conn);
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();

        tokio::task::spawn_blocking(move || -> Result<Entries> {
            let conn = conn.lock().map_err(poisoned)?;
            let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;

            let mut entries = Entries::new();
            for key in keys {
                let raw: Option<String> = stmt
                    .query_row(params![key], |row| row.get(0))
                    .optional()?;
                let Some(raw) = raw else { continue };

                match serde_json::from_str(&raw) {
                    Ok(value) => {
                        entries.insert(key, value);
                    }
                    Err(e) => warn!(key = %key, error = %e, "Ignoring unreadable stored value"),
                }
            }
            Ok(entries)
        })
        .await
        .map_err(|e| SidenotesError::Storage(e.to_string()))?
    }

    async fn set(&self, entries: Entries) -> Result<()> {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut conn = conn.lock().map_err(poisoned)?;
            let tx = conn.transaction()?;
            for (key, value) in &entries {
                tx.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(|e| SidenotesError::Storage(e.to_string()))?
    }
}
