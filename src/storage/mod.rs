//! Key-value persistence gateway.
//!
//! The note store never talks to a storage technology directly. Everything
//! goes through [`StorageGateway`], a pair of async `get`/`set` calls over
//! named keys holding JSON values.

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

use async_trait::async_trait;

use crate::error::Result;

/// Ordered sequence of persisted notes.
pub const NOTES_KEY: &str = "notes";
/// Id of the note shown in the edit view.
pub const CURRENT_NOTE_ID_KEY: &str = "currentNoteId";
/// Sidebar theme, owned by the theme store.
pub const THEME_KEY: &str = "theme";

/// A batch of key/value pairs read from or written to a gateway.
pub type Entries = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Read the given keys. Missing keys are simply absent from the result.
    async fn get(&self, keys: &[&str]) -> Result<Entries>;

    /// Write every entry, last write wins per key.
    async fn set(&self, entries: Entries) -> Result<()>;
}
