mod note;

pub use note::{Note, PersistedNote};

use serde::{Deserialize, Serialize};

/// Opaque note identifier, stable for the note's lifetime and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(NoteId)
            .map_err(|_| format!("Invalid note id: {}", s))
    }
}

/// Where a note's title comes from.
///
/// The transition is one-way: a rename moves a note from `Auto` to `Manual`
/// and nothing moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleMode {
    #[default]
    Auto,
    Manual,
}

impl TitleMode {
    pub fn is_manual(self) -> bool {
        self == TitleMode::Manual
    }
}

impl From<bool> for TitleMode {
    fn from(manually_set: bool) -> Self {
        if manually_set {
            TitleMode::Manual
        } else {
            TitleMode::Auto
        }
    }
}
