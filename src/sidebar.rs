//! Sidebar controller: turns user actions into store mutations and decides
//! when each one is persisted.
//!
//! Content edits arrive per keystroke and are written through a debounce
//! slot. Everything else (create, rename, delete, switch) is written right
//! away and takes over the slot, since that snapshot already carries the
//! edited content.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SidebarConfig;
use crate::entity::NoteId;
use crate::error::Result;
use crate::persist::{Debouncer, PersistenceWriter};
use crate::storage::{StorageGateway, CURRENT_NOTE_ID_KEY, NOTES_KEY};
use crate::store::{decode_entries, NoteStore};

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteListItem {
    pub id: NoteId,
    pub title: String,
    pub active: bool,
}

pub struct Sidebar {
    store: NoteStore,
    writer: PersistenceWriter,
    debouncer: Debouncer,
    config: SidebarConfig,
}

impl Sidebar {
    /// Read notes from the gateway and start the background writer.
    ///
    /// If hydration had to seed or repair anything, the repaired state is
    /// written back right away so ids stay stable across sessions. A failed
    /// read is returned as-is rather than seeding, so a transient storage
    /// error can't end with the seed note overwriting real notes.
    pub async fn load(gateway: Arc<dyn StorageGateway>, config: SidebarConfig) -> Result<Self> {
        let entries = gateway.get(&[NOTES_KEY, CURRENT_NOTE_ID_KEY]).await?;
        let (notes, current) = decode_entries(&entries);
        let store = NoteStore::hydrate(notes.clone(), current);

        let writer = PersistenceWriter::spawn(gateway, config.retry_policy());
        let debouncer = Debouncer::new(config.debounce());

        let snapshot = store.snapshot();
        if notes.as_ref() != Some(&snapshot.notes) || current != Some(snapshot.current_note_id) {
            debug!("Writing back repaired note state");
            writer.submit(snapshot);
        }

        Ok(Self {
            store,
            writer,
            debouncer,
            config,
        })
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn list_items(&self) -> Vec<NoteListItem> {
        let current = self.store.current_id();
        self.store
            .notes()
            .iter()
            .map(|note| NoteListItem {
                id: note.id,
                title: note.title.clone(),
                active: note.id == current,
            })
            .collect()
    }

    pub fn current_content(&self) -> &str {
        &self.store.current().content
    }

    /// Create a note, select it, and optionally name it straight away.
    pub fn new_note(&mut self, title: Option<&str>) -> Result<NoteId> {
        let id = self.store.create();
        if let Some(title) = title {
            self.store.rename(id, title)?;
        }
        self.persist_now();
        Ok(id)
    }

    pub fn rename(&mut self, id: NoteId, title: &str) -> Result<Option<String>> {
        let applied = self.store.rename(id, title)?;
        if applied.is_some() {
            self.persist_now();
        }
        Ok(applied)
    }

    /// Replace a note's content. The write is debounced.
    pub fn edit(&mut self, id: NoteId, content: impl Into<String>) -> Result<Option<String>> {
        let retitled = self.store.edit(id, content)?;
        self.persist_debounced();
        Ok(retitled)
    }

    pub fn edit_current(&mut self, content: impl Into<String>) -> Result<Option<String>> {
        self.edit(self.store.current_id(), content)
    }

    pub fn delete(&mut self, id: NoteId) -> Result<()> {
        self.store.delete(id)?;
        self.persist_now();
        Ok(())
    }

    pub fn switch(&mut self, id: NoteId) -> Result<()> {
        self.store.switch(id)?;
        self.persist_now();
        Ok(())
    }

    pub fn has_pending_write(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Let a pending debounced write fire on schedule, then wait for the
    /// writer to drain.
    ///
    /// Errors if the latest state could not be written; memory keeps it
    /// either way.
    pub async fn settle(&mut self) -> Result<()> {
        self.debouncer.settle().await;
        self.writer.sync().await
    }

    /// Stop the writer. A debounced write still waiting on its timer is
    /// dropped unless `flush_on_close` is set.
    pub async fn close(self) -> Result<()> {
        let Sidebar {
            store,
            writer,
            mut debouncer,
            config,
        } = self;

        if debouncer.cancel() {
            if config.flush_on_close {
                debug!("Flushing pending edit on close");
                writer.submit(store.snapshot());
            } else {
                warn!("Closing with an unsaved edit pending, it will not be written");
            }
        }
        writer.shutdown().await
    }

    fn persist_now(&mut self) {
        if self.debouncer.cancel() {
            debug!("Immediate write supersedes pending edit write");
        }
        self.writer.submit(self.store.snapshot());
    }

    fn persist_debounced(&mut self) {
        let queue = self.writer.queue();
        let snapshot = self.store.snapshot();
        self.debouncer.schedule(async move {
            queue.submit(snapshot);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TitleMode;
    use crate::error::SidenotesError;
    use crate::storage::{Entries, MemoryStorage};
    use crate::title::{PLACEHOLDER_TITLE, SEED_TITLE};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::time::sleep;

    struct UnreadableStorage;

    #[async_trait]
    impl StorageGateway for UnreadableStorage {
        async fn get(&self, _keys: &[&str]) -> Result<Entries> {
            Err(SidenotesError::Storage("read rejected".to_string()))
        }

        async fn set(&self, _entries: Entries) -> Result<()> {
            Ok(())
        }
    }

    fn stored(notes: Value, current: Value) -> Arc<MemoryStorage> {
        let mut entries = Entries::new();
        entries.insert(NOTES_KEY.to_string(), notes);
        entries.insert(CURRENT_NOTE_ID_KEY.to_string(), current);
        Arc::new(MemoryStorage::with_entries(entries))
    }

    fn two_notes() -> Arc<MemoryStorage> {
        stored(
            json!([
                { "id": 1, "title": "First", "content": "first body", "titleManuallySet": false },
                { "id": 2, "title": "Second", "content": "second body", "titleManuallySet": false }
            ]),
            json!(1),
        )
    }

    async fn open(storage: &Arc<MemoryStorage>) -> Sidebar {
        Sidebar::load(storage.clone(), SidebarConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_empty_storage_persists_seed() {
        let storage = Arc::new(MemoryStorage::new());
        let mut sidebar = open(&storage).await;

        let items = sidebar.list_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, SEED_TITLE);
        assert!(items[0].active);

        sidebar.settle().await.unwrap();
        assert_eq!(storage.write_log().len(), 1);
        assert_eq!(storage.value(CURRENT_NOTE_ID_KEY), Some(json!(items[0].id.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_clean_state_does_not_write() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        sidebar.settle().await.unwrap();
        assert!(storage.write_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_repairs_partial_records() {
        let storage = stored(json!([{ "id": 4, "content": "loose words only" }]), json!(77));
        let mut sidebar = open(&storage).await;
        sidebar.settle().await.unwrap();

        assert_eq!(
            storage.value(NOTES_KEY),
            Some(json!([{
                "id": 4,
                "title": "loose words only",
                "content": "loose words only",
                "titleManuallySet": false
            }]))
        );
        assert_eq!(storage.value(CURRENT_NOTE_ID_KEY), Some(json!(4)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_read_failure_is_returned() {
        let result = Sidebar::load(Arc::new(UnreadableStorage), SidebarConfig::default()).await;
        assert!(matches!(result, Err(SidenotesError::Storage(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_burst_writes_once_with_last_content() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        for text in ["h", "he", "hel", "hell", "hello there"] {
            sidebar.edit_current(text).unwrap();
            sleep(Duration::from_millis(50)).await;
        }
        assert!(storage.write_log().is_empty());

        sidebar.settle().await.unwrap();
        let log = storage.write_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0][NOTES_KEY][0]["content"], json!("hello there"));
        assert_eq!(log[0][NOTES_KEY][0]["title"], json!("hello there"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_reports_title_only_for_auto_notes() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        assert_eq!(
            sidebar.edit(NoteId(2), "fresh words go here").unwrap().as_deref(),
            Some("fresh words go")
        );

        sidebar.rename(NoteId(2), "Fixed").unwrap();
        assert_eq!(sidebar.edit(NoteId(2), "other").unwrap(), None);
        assert_eq!(sidebar.store().get(NoteId(2)).unwrap().title, "Fixed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_edits_write_separately() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        sidebar.edit_current("one").unwrap();
        sleep(Duration::from_millis(400)).await;
        sidebar.edit_current("two").unwrap();
        sidebar.settle().await.unwrap();

        assert_eq!(storage.write_log().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_structural_changes_write_immediately() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        sidebar.switch(NoteId(2)).unwrap();
        sidebar.writer.sync().await.unwrap();
        assert_eq!(storage.write_log().len(), 1);
        assert_eq!(storage.value(CURRENT_NOTE_ID_KEY), Some(json!(2)));

        let id = sidebar.new_note(None).unwrap();
        sidebar.writer.sync().await.unwrap();
        assert_eq!(storage.write_log().len(), 2);
        assert_eq!(storage.value(CURRENT_NOTE_ID_KEY), Some(json!(id.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_write_absorbs_pending_edit() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        sidebar.edit_current("typed text").unwrap();
        assert!(sidebar.has_pending_write());
        sidebar.rename(NoteId(1), "Renamed").unwrap();
        assert!(!sidebar.has_pending_write());

        sidebar.settle().await.unwrap();
        sleep(Duration::from_secs(1)).await;

        let log = storage.write_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0][NOTES_KEY][0]["content"], json!("typed text"));
        assert_eq!(log[0][NOTES_KEY][0]["title"], json!("Renamed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_note_with_title_is_renamed_uniquely() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        let id = sidebar.new_note(Some("First")).unwrap();
        let note = sidebar.store().get(id).unwrap();
        assert_eq!(note.title, "First 2");
        assert_eq!(note.title_mode, TitleMode::Manual);
        assert_eq!(sidebar.list_items()[0].id, id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_rename_does_not_write() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        assert_eq!(sidebar.rename(NoteId(1), "  ").unwrap(), None);
        sidebar.settle().await.unwrap();
        assert!(storage.write_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_last_note_persists_placeholder() {
        let storage = stored(
            json!([{ "id": 1, "title": "Only", "content": "", "titleManuallySet": true }]),
            json!(1),
        );
        let mut sidebar = open(&storage).await;

        sidebar.delete(NoteId(1)).unwrap();
        sidebar.settle().await.unwrap();

        let items = sidebar.list_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, PLACEHOLDER_TITLE);
        assert!(items[0].active);

        let notes = storage.value(NOTES_KEY).unwrap();
        assert_eq!(notes.as_array().unwrap().len(), 1);
        assert_eq!(storage.value(CURRENT_NOTE_ID_KEY), Some(json!(items[0].id.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_id_is_reported_and_not_written() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        assert!(matches!(
            sidebar.switch(NoteId(99)),
            Err(SidenotesError::NoteNotFound(NoteId(99)))
        ));
        assert!(sidebar.delete(NoteId(99)).is_err());
        assert!(sidebar.edit(NoteId(99), "x").is_err());

        sidebar.settle().await.unwrap();
        assert!(storage.write_log().is_empty());
        assert!(!sidebar.has_pending_write());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_writes_keep_memory_state() {
        let storage = two_notes();
        storage.fail_writes(100);
        let mut sidebar = open(&storage).await;

        sidebar.rename(NoteId(2), "Kept").unwrap();
        assert!(matches!(
            sidebar.settle().await,
            Err(SidenotesError::Storage(_))
        ));

        assert!(storage.write_log().is_empty());
        assert_eq!(sidebar.store().get(NoteId(2)).unwrap().title, "Kept");
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_pending_edit_by_default() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        sidebar.edit_current("unsaved").unwrap();
        sidebar.close().await.unwrap();
        sleep(Duration::from_secs(1)).await;

        assert!(storage.write_log().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_when_configured() {
        let storage = two_notes();
        let config = SidebarConfig {
            flush_on_close: true,
            ..SidebarConfig::default()
        };
        let mut sidebar = Sidebar::load(storage.clone(), config).await.unwrap();

        sidebar.edit_current("saved on close").unwrap();
        sidebar.close().await.unwrap();

        let log = storage.write_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0][NOTES_KEY][0]["content"], json!("saved on close"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_survives_reload() {
        let storage = two_notes();
        let mut sidebar = open(&storage).await;

        let id = sidebar.new_note(Some("Third")).unwrap();
        sidebar.edit(id, "third body").unwrap();
        sidebar.settle().await.unwrap();
        let before = sidebar.list_items();
        sidebar.close().await.unwrap();

        let reopened = open(&storage).await;
        assert_eq!(reopened.list_items(), before);
        assert_eq!(reopened.current_content(), "third body");
    }
}
