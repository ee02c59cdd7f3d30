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

//! Library configuration
//!
//! Hosts pass this as JSON through the bridges; the CLI builds it from flags.
//! The core never reads environment variables for configuration.
//!
//! # Example
//! ```rust
//! use bookworm_core::config::{LibraryConfig, RecoveryPolicy, StorageBackend};
//!
//! let config = LibraryConfig::builder()
//!     .data_dir("/tmp/bookworm")
//!     .backend(StorageBackend::Sqlite)
//!     .recovery(RecoveryPolicy::Reset)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.top_rated_count, 3);
//! ```

use crate::error::{BookwormError, Result};
use crate::library::views::DEFAULT_TOP_RATED_COUNT;
use crate::storage::collection_store::DEFAULT_COLLECTION_KEY;
use crate::storage::validate_key;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default blob name of the display settings
pub const DEFAULT_SETTINGS_KEY: &str = "settings.json";

/// File name of the SQLite database inside the data directory
pub const DATABASE_FILE_NAME: &str = "bookworm.db";

/// Where blobs are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per blob key in the data directory
    #[default]
    File,
    /// `blobs` table in `bookworm.db`
    Sqlite,
    /// Process memory, lost on exit
    Memory,
}

/// What to do when the collection blob exists but cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryPolicy {
    /// Fail the open with `CorruptStore`
    Abort,
    /// Start with an empty collection; the blob is overwritten on the next save
    #[default]
    StartEmpty,
    /// Back the blob up to `<key>.corrupt` and reseed
    Reset,
}

/// Library configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root of all persisted state
    pub data_dir: PathBuf,
    pub backend: StorageBackend,
    /// Blob name of the collection
    pub collection_key: String,
    /// Blob name of the display settings
    pub settings_key: String,
    /// Length of the home-screen top list
    pub top_rated_count: usize,
    pub recovery: RecoveryPolicy,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: StorageBackend::default(),
            collection_key: DEFAULT_COLLECTION_KEY.to_string(),
            settings_key: DEFAULT_SETTINGS_KEY.to_string(),
            top_rated_count: DEFAULT_TOP_RATED_COUNT,
            recovery: RecoveryPolicy::default(),
        }
    }
}

impl LibraryConfig {
    pub fn builder() -> LibraryConfigBuilder {
        LibraryConfigBuilder::default()
    }

    /// Defaults rooted at `data_dir`
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Path of the SQLite database used by the `Sqlite` backend
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }

    /// Check the configuration before anything is opened
    pub fn validate(&self) -> Result<()> {
        validate_key(&self.collection_key).map_err(|_| {
            BookwormError::InvalidConfiguration(format!(
                "collection_key '{}' is not a plain file name",
                self.collection_key
            ))
        })?;
        validate_key(&self.settings_key).map_err(|_| {
            BookwormError::InvalidConfiguration(format!(
                "settings_key '{}' is not a plain file name",
                self.settings_key
            ))
        })?;

        if self.collection_key == self.settings_key {
            return Err(BookwormError::InvalidConfiguration(
                "collection_key and settings_key must differ".to_string(),
            ));
        }

        if self.top_rated_count == 0 {
            return Err(BookwormError::InvalidConfiguration(
                "top_rated_count must be at least 1".to_string(),
            ));
        }

        if self.backend != StorageBackend::Memory && self.data_dir.as_os_str().is_empty() {
            return Err(BookwormError::InvalidConfiguration(
                "data_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Chained setters over [`LibraryConfig::default`]
#[derive(Debug, Clone, Default)]
pub struct LibraryConfigBuilder {
    config: LibraryConfig,
}

impl LibraryConfigBuilder {
    pub fn data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = data_dir.into();
        self
    }

    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn collection_key(mut self, key: impl Into<String>) -> Self {
        self.config.collection_key = key.into();
        self
    }

    pub fn settings_key(mut self, key: impl Into<String>) -> Self {
        self.config.settings_key = key.into();
        self
    }

    pub fn top_rated_count(mut self, count: usize) -> Self {
        self.config.top_rated_count = count;
        self
    }

    pub fn recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.config.recovery = recovery;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<LibraryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Platform default for the data directory
///
/// Mobile hosts should pass their own app files directory instead.
pub fn default_data_dir() -> PathBuf {
    let fallback = PathBuf::from("./bookworm-data");

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|home| {
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("Bookworm")
            })
            .unwrap_or(fallback)
    }

    #[cfg(target_os = "linux")]
    {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local").join("share").join("bookworm"))
            .unwrap_or(fallback)
    }

    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(|appdata| PathBuf::from(appdata).join("Bookworm"))
            .unwrap_or(fallback)
    }

    #[cfg(target_os = "android")]
    {
        // Overridden by the Kotlin layer with Context.filesDir
        let _ = fallback;
        PathBuf::from("/data/data/com.zybooks.bookworm/files")
    }

    #[cfg(target_os = "ios")]
    {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join("Documents").join("bookworm"))
            .unwrap_or(fallback)
    }

    #[cfg(not(any(
        target_os = "macos",
        target_os = "linux",
        target_os = "windows",
        target_os = "android",
        target_os = "ios"
    )))]
    {
        fallback
    }
}
