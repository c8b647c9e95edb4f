use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use crate::config::SidebarConfig;
use crate::entity::NoteId;
use crate::error::{Result, SidenotesError};
use crate::sidebar::Sidebar;
use crate::storage::SqliteStorage;
use crate::theme::{Theme, ThemeStore};

fn open_storage(dir: &Path) -> Result<Arc<SqliteStorage>> {
    Ok(Arc::new(SqliteStorage::open(dir)?))
}

async fn open_sidebar(dir: &Path) -> Result<Sidebar> {
    let config = SidebarConfig::load(dir)?;
    Sidebar::load(open_storage(dir)?, config).await
}

/// Wait for every write this command caused, then shut the sidebar down.
async fn finish(mut sidebar: Sidebar) -> Result<()> {
    let settled = sidebar.settle().await;
    let closed = sidebar.close().await;
    settled.and(closed)
}

pub async fn handle_list(dir: &Path, json: bool) -> Result<()> {
    let sidebar = open_sidebar(dir).await?;
    let items = sidebar.list_items();

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for item in &items {
            let marker = if item.active { "*" } else { " " };
            println!("{} {} {}", marker, item.id, item.title);
        }
    }

    finish(sidebar).await
}

pub async fn handle_show(dir: &Path, id: Option<NoteId>, json: bool) -> Result<()> {
    let sidebar = open_sidebar(dir).await?;

    let note = match id {
        Some(id) => sidebar
            .store()
            .get(id)
            .ok_or(SidenotesError::NoteNotFound(id))?,
        None => sidebar.store().current(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&note.to_persisted())?);
    } else {
        println!("# {}", note.title);
        println!();
        println!("{}", note.content);
    }

    finish(sidebar).await
}

pub async fn handle_new(dir: &Path, title: Option<String>, json: bool) -> Result<()> {
    let mut sidebar = open_sidebar(dir).await?;
    let id = sidebar.new_note(title.as_deref())?;

    if json {
        if let Some(note) = sidebar.store().get(id) {
            println!("{}", serde_json::to_string_pretty(&note.to_persisted())?);
        }
    } else if let Some(note) = sidebar.store().get(id) {
        println!("Created note {} - {}", note.id, note.title);
    }

    finish(sidebar).await
}

pub async fn handle_rename(dir: &Path, id: NoteId, title: String) -> Result<()> {
    let mut sidebar = open_sidebar(dir).await?;

    match sidebar.rename(id, &title)? {
        Some(applied) => println!("Renamed note {} to {}", id, applied),
        None => println!("Title is blank, note {} unchanged", id),
    }

    finish(sidebar).await
}

pub async fn handle_edit(
    dir: &Path,
    content: Option<String>,
    id: Option<NoteId>,
    stdin: bool,
) -> Result<()> {
    let content = if stdin {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        content.unwrap_or_default()
    };

    let mut sidebar = open_sidebar(dir).await?;
    let id = id.unwrap_or_else(|| sidebar.store().current_id());

    match sidebar.edit(id, content)? {
        Some(title) => println!("Updated note {} - {}", id, title),
        None => println!("Updated note {}", id),
    }

    finish(sidebar).await
}

pub async fn handle_delete(dir: &Path, id: NoteId) -> Result<()> {
    let mut sidebar = open_sidebar(dir).await?;
    sidebar.delete(id)?;

    let current = sidebar.store().current();
    println!("Deleted note {}. Current note: {} - {}", id, current.id, current.title);

    finish(sidebar).await
}

pub async fn handle_switch(dir: &Path, id: NoteId) -> Result<()> {
    let mut sidebar = open_sidebar(dir).await?;
    sidebar.switch(id)?;

    println!("Switched to note {} - {}", id, sidebar.store().current().title);

    finish(sidebar).await
}

pub async fn handle_theme(dir: &Path, value: Option<String>) -> Result<()> {
    let mut themes = ThemeStore::load(open_storage(dir)?).await?;

    let theme = match value.as_deref() {
        None => themes.theme(),
        Some("toggle") => themes.toggle().await?,
        Some(name) => {
            let theme: Theme = name.parse()?;
            themes.set(theme).await?;
            theme
        }
    };

    println!("Theme: {}", theme);
    Ok(())
}
