mod ids;
mod note_store;
mod snapshot;

pub use ids::IdAllocator;
pub use note_store::NoteStore;
pub use snapshot::{decode_entries, NotesSnapshot};
