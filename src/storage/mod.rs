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

//! Blob storage and the collection store
//!
//! The core treats persistence as an external key/value blob collaborator:
//! one named blob holds the whole collection as a JSON array, another holds
//! the display settings. Backends:
//!
//! - [`FileBlobStore`] - one file per key under the data directory (default)
//! - [`SqliteBlobStore`] - a `blobs` table in `bookworm.db`
//! - [`MemoryBlobStore`] - process memory, for tests and previews
//!
//! [`StoreBackend`] selects one of them from a [`LibraryConfig`].
//!
//! # Usage Example
//! ```no_run
//! use bookworm_core::storage::{CollectionStore, FileBlobStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = CollectionStore::new(FileBlobStore::new("./bookworm-data".into()));
//! let outcome = store.load().await?;
//! println!("{} books", outcome.books().len());
//! # Ok(())
//! # }
//! ```

pub mod collection_store;
pub mod file;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use crate::config::{LibraryConfig, StorageBackend};
use crate::error::{BookwormError, Result};

// Re-export commonly used types
pub use collection_store::{CollectionStore, LoadOutcome};
pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;
pub use sqlite::SqliteBlobStore;

/// Key/value blob persistence
///
/// `write` replaces the whole blob. Partial writes must never be observable
/// through `read`.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Read a blob, `None` if it was never written
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite a blob
    async fn write(&self, key: &str, contents: &[u8]) -> Result<()>;

    /// Check whether a blob exists
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.read(key).await?.is_some())
    }

    /// Human-readable location, used in log events
    fn describe(&self) -> String;
}

/// Check that a key can be used as a blob name on every backend
///
/// Keys are plain file names: no separators, no leading dot, no `..`.
pub fn validate_key(key: &str) -> Result<()> {
    let invalid = key.trim().is_empty()
        || key.starts_with('.')
        || key.contains("..")
        || key.chars().any(|c| matches!(c, '/' | '\\' | '\0' | ':'));

    if invalid {
        return Err(BookwormError::InvalidStoreKey(key.to_string()));
    }
    Ok(())
}

/// Backend chosen at runtime from configuration
#[derive(Debug, Clone)]
pub enum StoreBackend {
    File(FileBlobStore),
    Sqlite(SqliteBlobStore),
    Memory(MemoryBlobStore),
}

impl StoreBackend {
    /// Open the backend named in `config`
    pub async fn open(config: &LibraryConfig) -> Result<Self> {
        match config.backend {
            StorageBackend::File => Ok(StoreBackend::File(FileBlobStore::new(
                config.data_dir.clone(),
            ))),
            StorageBackend::Sqlite => Ok(StoreBackend::Sqlite(
                SqliteBlobStore::new(config.database_path()).await?,
            )),
            StorageBackend::Memory => Ok(StoreBackend::Memory(MemoryBlobStore::new())),
        }
    }
}

impl BlobStore for StoreBackend {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self {
            StoreBackend::File(store) => store.read(key).await,
            StoreBackend::Sqlite(store) => store.read(key).await,
            StoreBackend::Memory(store) => store.read(key).await,
        }
    }

    async fn write(&self, key: &str, contents: &[u8]) -> Result<()> {
        match self {
            StoreBackend::File(store) => store.write(key, contents).await,
            StoreBackend::Sqlite(store) => store.write(key, contents).await,
            StoreBackend::Memory(store) => store.write(key, contents).await,
        }
    }

    fn describe(&self) -> String {
        match self {
            StoreBackend::File(store) => store.describe(),
            StoreBackend::Sqlite(store) => store.describe(),
            StoreBackend::Memory(store) => store.describe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("books.json").is_ok());
        assert!(validate_key("settings.json").is_ok());

        for bad in ["", "  ", ".hidden", "../books.json", "a/b", "a\\b", "c:books"] {
            assert!(
                matches!(validate_key(bad), Err(BookwormError::InvalidStoreKey(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let config = LibraryConfig::builder()
            .backend(StorageBackend::Memory)
            .build()
            .unwrap();

        let backend = StoreBackend::open(&config).await.unwrap();
        assert!(matches!(backend, StoreBackend::Memory(_)));

        backend.write("books.json", b"[]").await.unwrap();
        assert!(backend.exists("books.json").await.unwrap());
        assert!(!backend.exists("settings.json").await.unwrap());
    }
}
