use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::entity::NoteId;

#[derive(Parser, Debug)]
#[command(name = "sidenotes")]
#[command(version, about = "A small sidebar notebook backed by a key-value store")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding notes.db and an optional config.json
    #[arg(long, global = true, default_value = ".sidenotes", env = "SIDENOTES_DIR")]
    pub dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes, marking the current one
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a note's content (the current note by default)
    Show {
        /// Note ID
        id: Option<NoteId>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new note and make it current
    New {
        /// Title to give the note right away
        #[arg(long, short = 't')]
        title: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a note
    Rename {
        /// Note ID
        id: NoteId,

        /// New title (made unique by appending a number if taken)
        title: String,
    },

    /// Replace a note's content
    Edit {
        /// Content to store
        #[arg(required_unless_present = "stdin")]
        content: Option<String>,

        /// Note ID (the current note by default)
        #[arg(long)]
        id: Option<NoteId>,

        /// Read content from stdin
        #[arg(long, conflicts_with = "content")]
        stdin: bool,
    },

    /// Delete a note
    Delete {
        /// Note ID
        id: NoteId,
    },

    /// Make a note current
    Switch {
        /// Note ID
        id: NoteId,
    },

    /// Show or change the theme
    Theme {
        /// light, dark, or toggle
        #[arg(value_name = "THEME")]
        value: Option<String>,
    },
}
