// Bookworm - Personal Library Tracker
// Copyright (C) 2025 Bookworm contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Display settings
//!
//! The settings screen toggles between the light and dark theme and turns
//! notifications on or off. Both are kept as one small JSON object in the
//! same blob store as the collection.

use crate::config::DEFAULT_SETTINGS_KEY;
use crate::error::Result;
use crate::storage::{validate_key, BlobStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Persisted display preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub dark_theme: bool,
    pub notifications: bool,
}

/// Theme the host should apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
}

impl DisplaySettings {
    pub fn color_scheme(&self) -> ColorScheme {
        if self.dark_theme {
            ColorScheme::Dark
        } else {
            ColorScheme::Light
        }
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(dark_theme) = update.dark_theme {
            self.dark_theme = dark_theme;
        }
        if let Some(notifications) = update.notifications {
            self.notifications = notifications;
        }
    }
}

/// Partial settings change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    pub dark_theme: Option<bool>,
    pub notifications: Option<bool>,
}

/// Loads and saves [`DisplaySettings`] under one blob key
#[derive(Debug, Clone)]
pub struct SettingsStore<S> {
    store: S,
    key: String,
}

impl<S: BlobStore> SettingsStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: DEFAULT_SETTINGS_KEY.to_string(),
        }
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { store, key })
    }

    /// Stored settings, defaults when missing or unreadable
    pub async fn load(&self) -> Result<DisplaySettings> {
        let Some(bytes) = self.store.read(&self.key).await? else {
            return Ok(DisplaySettings::default());
        };

        match serde_json::from_slice(&bytes) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring unreadable settings");
                Ok(DisplaySettings::default())
            }
        }
    }

    pub async fn save(&self, settings: &DisplaySettings) -> Result<()> {
        let bytes = serde_json::to_vec(settings)?;
        self.store.write(&self.key, &bytes).await?;
        debug!(key = %self.key, dark_theme = settings.dark_theme, notifications = settings.notifications, "Saved settings");
        Ok(())
    }

    /// Load, apply `update`, save and return the result
    pub async fn update(&self, update: SettingsUpdate) -> Result<DisplaySettings> {
        let mut settings = self.load().await?;
        settings.apply(update);
        self.save(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileBlobStore, MemoryBlobStore};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_and_corrupt_settings_default() {
        let store = SettingsStore::new(MemoryBlobStore::new());
        assert_eq!(store.load().await.unwrap(), DisplaySettings::default());

        let store = SettingsStore::new(MemoryBlobStore::with_blob("settings.json", "dark please"));
        assert_eq!(store.load().await.unwrap(), DisplaySettings::default());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(FileBlobStore::new(temp_dir.path().to_path_buf()));

        let settings = store
            .update(SettingsUpdate {
                dark_theme: Some(true),
                notifications: None,
            })
            .await
            .unwrap();
        assert_eq!(settings.color_scheme(), ColorScheme::Dark);
        assert!(!settings.notifications);

        let raw = std::fs::read_to_string(temp_dir.path().join("settings.json")).unwrap();
        assert_eq!(raw, r#"{"darkTheme":true,"notifications":false}"#);
        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[test]
    fn test_color_scheme() {
        assert_eq!(DisplaySettings::default().color_scheme(), ColorScheme::Light);
    }
}
