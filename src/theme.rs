//! Persisted light/dark theme preference.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::storage::LocalStorage;

/// Storage key holding the theme preference.
pub const THEME_KEY: &str = "dalil.theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Get the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Get the opposite theme.
    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme `{}`", other)),
        }
    }
}

/// Reads and writes the theme preference.
#[derive(Clone)]
pub struct ThemeStore {
    storage: Arc<dyn LocalStorage>,
}

impl ThemeStore {
    /// Create a store over `storage`.
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// The saved theme, light when unset or unreadable.
    pub fn current(&self) -> Theme {
        match self.storage.get(THEME_KEY) {
            Ok(Some(value)) => value.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring stored theme");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    /// Persist `theme`.
    pub fn set(&self, theme: Theme) -> Result<()> {
        self.storage.set(THEME_KEY, theme.as_str())?;
        Ok(())
    }

    /// Switch to the other theme and return it.
    pub fn toggle(&self) -> Result<Theme> {
        let next = self.current().toggled();
        self.set(next)?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_default_is_light() {
        let store = ThemeStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.current(), Theme::Light);
    }

    #[test]
    fn test_toggle_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let store = ThemeStore::new(storage.clone());

        assert_eq!(store.toggle().unwrap(), Theme::Dark);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(store.toggle().unwrap(), Theme::Light);
    }

    #[test]
    fn test_garbage_value_reads_light() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeStore::new(storage).current(), Theme::Light);
    }

    #[test]
    fn test_parse() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("Dark".parse::<Theme>().is_err());
    }
}
