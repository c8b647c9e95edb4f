use serde_json::Value;
use tracing::warn;

use crate::entity::{NoteId, PersistedNote};
use crate::error::Result;
use crate::storage::{Entries, CURRENT_NOTE_ID_KEY, NOTES_KEY};

/// Point-in-time copy of the note collection, ready to hand to a gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct NotesSnapshot {
    /// Store revision the snapshot was taken at. Higher is newer.
    pub revision: u64,
    pub notes: Vec<PersistedNote>,
    pub current_note_id: NoteId,
}

impl NotesSnapshot {
    /// Encode as one `set` batch. Notes and current id always travel together
    /// so a reader never sees one without the other.
    pub fn to_entries(&self) -> Result<Entries> {
        let mut entries = Entries::new();
        entries.insert(NOTES_KEY.to_string(), serde_json::to_value(&self.notes)?);
        entries.insert(
            CURRENT_NOTE_ID_KEY.to_string(),
            serde_json::to_value(self.current_note_id)?,
        );
        Ok(entries)
    }
}

/// Pull the notes and current id out of whatever a gateway returned.
///
/// Anything unusable reads as absent: a `notes` value that is not an array,
/// array items that are not objects, a current id that is not an integer.
pub fn decode_entries(entries: &Entries) -> (Option<Vec<PersistedNote>>, Option<NoteId>) {
    let notes = match entries.get(NOTES_KEY) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    if !item.is_object() {
                        warn!(index, "Dropping stored note that is not an object");
                        return None;
                    }
                    serde_json::from_value::<PersistedNote>(item.clone()).ok()
                })
                .collect(),
        ),
        Some(other) => {
            warn!(value = %other, "Ignoring stored notes that are not a list");
            None
        }
    };

    let current = entries
        .get(CURRENT_NOTE_ID_KEY)
        .and_then(Value::as_i64)
        .map(NoteId);

    (notes, current)
}
