pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod logging;
pub mod persist;
pub mod sidebar;
pub mod storage;
pub mod store;
pub mod theme;
pub mod title;

pub use config::SidebarConfig;
pub use error::{Result, SidenotesError};
pub use sidebar::{NoteListItem, Sidebar};
pub use store::NoteStore;
