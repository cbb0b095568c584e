//! Process-wide observable settings persisted in the key-value store.

use crate::{CacheError, Store};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

/// Store key holding the theme mode.
pub const THEME_MODE_KEY: &str = "theme-mode";

/// Color scheme preference. Dark unless the user chose otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Lowercase name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(CacheError::InvalidValue {
                key: THEME_MODE_KEY.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// User settings with get/set/subscribe semantics.
///
/// Every change is written to the store first and then broadcast to
/// subscribers, so a subscriber never sees a value that was not persisted.
#[derive(Debug)]
pub struct Settings {
    store: Arc<Store>,
    theme: watch::Sender<ThemeMode>,
}

impl Settings {
    /// Load settings from the store. A stored value wins over the default;
    /// an unreadable one is ignored.
    pub fn load(store: Arc<Store>) -> Self {
        let theme = match store.get::<String>(THEME_MODE_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring stored theme mode");
                ThemeMode::default()
            }),
            Ok(None) => ThemeMode::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring stored theme mode");
                ThemeMode::default()
            }
        };
        let (sender, _) = watch::channel(theme);
        Self {
            store,
            theme: sender,
        }
    }

    /// Current theme mode.
    pub fn theme(&self) -> ThemeMode {
        *self.theme.borrow()
    }

    /// Persist and broadcast a theme mode.
    pub fn set_theme(&self, mode: ThemeMode) -> Result<(), CacheError> {
        self.store.set(THEME_MODE_KEY, &mode.as_str())?;
        self.theme.send_replace(mode);
        Ok(())
    }

    /// Switch between light and dark. Returns the new mode.
    pub fn toggle_theme(&self) -> Result<ThemeMode, CacheError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    /// Receive every future theme change.
    pub fn subscribe(&self) -> watch::Receiver<ThemeMode> {
        self.theme.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dark() {
        let settings = Settings::load(Arc::new(Store::in_memory()));
        assert_eq!(settings.theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_stored_value_wins() {
        let store = Arc::new(Store::in_memory());
        store.set(THEME_MODE_KEY, &"light").unwrap();
        assert_eq!(Settings::load(store).theme(), ThemeMode::Light);
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        let store = Arc::new(Store::in_memory());
        store.set(THEME_MODE_KEY, &"sepia").unwrap();
        assert_eq!(Settings::load(store).theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_toggle_persists() {
        let store = Arc::new(Store::in_memory());
        let settings = Settings::load(store.clone());
        assert_eq!(settings.toggle_theme().unwrap(), ThemeMode::Light);
        assert_eq!(
            store.get::<String>(THEME_MODE_KEY).unwrap().as_deref(),
            Some("light")
        );
        assert_eq!(settings.toggle_theme().unwrap(), ThemeMode::Dark);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let settings = Settings::load(Arc::new(Store::in_memory()));
        let mut rx = settings.subscribe();
        settings.set_theme(ThemeMode::Light).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ThemeMode::Light);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(" Dark ".parse::<ThemeMode>().unwrap(), ThemeMode::Dark);
        assert!("blue".parse::<ThemeMode>().is_err());
    }
}
