use thiserror::Error;

use crate::entity::NoteId;

#[derive(Error, Debug)]
pub enum SidenotesError {
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("Invalid theme '{0}'. Valid themes: light, dark")]
    InvalidTheme(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, SidenotesError>;
