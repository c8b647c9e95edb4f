use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::ids::IdAllocator;
use super::snapshot::NotesSnapshot;
use crate::entity::{Note, NoteId, PersistedNote, TitleMode};
use crate::error::{Result, SidenotesError};
use crate::title::{auto_title, resolve_unique_title, PLACEHOLDER_TITLE, SEED_CONTENT, SEED_TITLE};

/// In-memory note collection plus the current-note pointer.
///
/// The collection is never empty and the current id always names a note in
/// it. Every public mutation keeps both true before returning.
#[derive(Debug)]
pub struct NoteStore {
    notes: Vec<Note>,
    current: NoteId,
    ids: IdAllocator,
    revision: u64,
}

impl NoteStore {
    /// Build a store from whatever was persisted.
    ///
    /// Missing titles are derived from content, missing flags default to
    /// auto-titling, and records without a usable or unique id get a fresh
    /// one. An empty result is replaced by a single seed note. The stored
    /// current id is kept only if it names a loaded note; otherwise the first
    /// note is selected.
    pub fn hydrate(persisted: Option<Vec<PersistedNote>>, current: Option<NoteId>) -> Self {
        let persisted = persisted.unwrap_or_default();

        let mut ids = IdAllocator::new();
        for id in persisted.iter().filter_map(|record| record.id) {
            ids.observe(id);
        }

        let mut seen = HashSet::new();
        let mut notes = Vec::with_capacity(persisted.len().max(1));
        for record in persisted {
            let id = match record.id {
                Some(id) if seen.insert(id) => id,
                Some(duplicate) => {
                    let id = ids.next_id();
                    warn!(duplicate = %duplicate, assigned = %id, "Reassigning duplicate note id");
                    seen.insert(id);
                    id
                }
                None => {
                    let id = ids.next_id();
                    warn!(assigned = %id, "Assigning id to stored note without one");
                    seen.insert(id);
                    id
                }
            };

            let content = record.content.unwrap_or_default();
            let title = match record.title {
                Some(title) if !title.is_empty() => title,
                _ => auto_title(&content),
            };

            notes.push(Note {
                id,
                title,
                content,
                title_mode: TitleMode::from(record.title_manually_set.unwrap_or(false)),
            });
        }

        if notes.is_empty() {
            let mut seed = Note::new(ids.next_id(), SEED_TITLE, SEED_CONTENT);
            seed.title_mode = TitleMode::Manual;
            debug!(id = %seed.id, "Seeding empty note collection");
            notes.push(seed);
        }

        let current = current
            .filter(|id| notes.iter().any(|n| n.id == *id))
            .unwrap_or(notes[0].id);

        info!(notes = notes.len(), current = %current, "Hydrated note store");

        Self {
            notes,
            current,
            ids,
            revision: 0,
        }
    }

    /// All notes, in display order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn current_id(&self) -> NoteId {
        self.current
    }

    pub fn current(&self) -> &Note {
        let found = self.get(self.current);
        debug_assert!(found.is_some(), "current id must reference a stored note");
        found.unwrap_or(&self.notes[0])
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Bumped on every mutation; snapshots carry it so writers can tell
    /// newer state from older.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Insert a placeholder note at the front and select it.
    pub fn create(&mut self) -> NoteId {
        let note = self.placeholder();
        let id = note.id;
        self.notes.insert(0, note);
        self.current = id;
        self.touch();
        debug!(id = %id, "Created note");
        id
    }

    /// Give a note a user-chosen title.
    ///
    /// Blank input (after trimming) leaves the note alone and returns
    /// `Ok(None)`. Otherwise the title is made unique against every other
    /// note, the note switches to manual titling, and the applied title is
    /// returned.
    pub fn rename(&mut self, id: NoteId, proposed: &str) -> Result<Option<String>> {
        let index = self.index_of(id)?;

        let trimmed = proposed.trim();
        if trimmed.is_empty() {
            debug!(id = %id, "Ignoring blank rename");
            return Ok(None);
        }

        let applied = resolve_unique_title(
            trimmed,
            self.notes
                .iter()
                .filter(|n| n.id != id)
                .map(|n| n.title.as_str()),
        );

        let note = &mut self.notes[index];
        note.title = applied.clone();
        note.title_mode = TitleMode::Manual;
        self.touch();

        debug!(id = %id, title = %applied, "Renamed note");
        Ok(Some(applied))
    }

    /// Replace a note's content.
    ///
    /// Returns the re-derived title when the note is still auto-titled, so a
    /// list label can be refreshed in place.
    pub fn edit(&mut self, id: NoteId, content: impl Into<String>) -> Result<Option<String>> {
        let index = self.index_of(id)?;

        let note = &mut self.notes[index];
        note.content = content.into();
        let retitled = match note.title_mode {
            TitleMode::Manual => None,
            TitleMode::Auto => {
                note.title = auto_title(&note.content);
                Some(note.title.clone())
            }
        };

        self.touch();
        Ok(retitled)
    }

    /// Remove a note.
    ///
    /// Removing the last note puts a fresh placeholder in its place. If the
    /// removed note was current, selection moves to the first note.
    pub fn delete(&mut self, id: NoteId) -> Result<()> {
        let index = self.index_of(id)?;
        self.notes.remove(index);

        if self.notes.is_empty() {
            let note = self.placeholder();
            debug!(id = %note.id, "Replacing last deleted note with placeholder");
            self.notes.push(note);
        }

        if self.current == id {
            self.current = self.notes[0].id;
        }

        self.touch();
        debug!(id = %id, current = %self.current, "Deleted note");
        Ok(())
    }

    /// Make `id` the current note.
    pub fn switch(&mut self, id: NoteId) -> Result<()> {
        self.index_of(id)?;
        self.current = id;
        self.touch();
        Ok(())
    }

    pub fn snapshot(&self) -> NotesSnapshot {
        NotesSnapshot {
            revision: self.revision,
            notes: self.notes.iter().map(Note::to_persisted).collect(),
            current_note_id: self.current,
        }
    }

    fn index_of(&self, id: NoteId) -> Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or(SidenotesError::NoteNotFound(id))
    }

    fn placeholder(&mut self) -> Note {
        Note::new(self.ids.next_id(), PLACEHOLDER_TITLE, "")
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
