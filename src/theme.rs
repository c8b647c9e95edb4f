//! Sidebar theme, stored under its own key and loaded independently of notes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{Result, SidenotesError};
use crate::storage::{Entries, StorageGateway, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = SidenotesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(SidenotesError::InvalidTheme(s.to_string())),
        }
    }
}

pub struct ThemeStore {
    gateway: Arc<dyn StorageGateway>,
    theme: Theme,
}

impl ThemeStore {
    /// Read the stored theme. Absent or unrecognized values mean light.
    pub async fn load(gateway: Arc<dyn StorageGateway>) -> Result<Self> {
        let entries = gateway.get(&[THEME_KEY]).await?;
        let theme = match entries.get(THEME_KEY) {
            None | Some(Value::Null) => Theme::default(),
            Some(Value::String(name)) => name.parse().unwrap_or_else(|_| {
                warn!(theme = %name, "Unknown stored theme, using light");
                Theme::default()
            }),
            Some(other) => {
                warn!(value = %other, "Stored theme is not a string, using light");
                Theme::default()
            }
        };

        Ok(Self { gateway, theme })
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Apply a theme and write it. The in-memory theme changes even if the
    /// write is rejected.
    pub async fn set(&mut self, theme: Theme) -> Result<()> {
        self.theme = theme;
        let mut entries = Entries::new();
        entries.insert(THEME_KEY.to_string(), serde_json::to_value(theme)?);
        self.gateway.set(entries).await
    }

    pub async fn toggle(&mut self) -> Result<Theme> {
        let next = self.theme.toggled();
        self.set(next).await?;
        Ok(next)
    }
}
