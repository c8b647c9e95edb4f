// src/entity/note.rs
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::{NoteId, TitleMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub title_mode: TitleMode,
}

impl Note {
    pub fn new(id: NoteId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            title_mode: TitleMode::Auto,
        }
    }

    pub fn to_persisted(&self) -> PersistedNote {
        PersistedNote {
            id: Some(self.id),
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            title_manually_set: Some(self.title_mode.is_manual()),
        }
    }
}

/// Wire shape of a note under the `"notes"` key.
///
/// Every field is optional on the way in, and a field holding a value of the
/// wrong type reads as absent, so partial records from older or hand-edited
/// storage still load. `NoteStore::hydrate` fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNote {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<NoteId>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub title_manually_set: Option<bool>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
