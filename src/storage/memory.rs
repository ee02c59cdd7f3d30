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

//! In-process blob store for tests and previews

use crate::error::{BookwormError, Result};
use crate::storage::{validate_key, BlobStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Blob store kept in process memory
///
/// Clones share the same blobs, so a test can hand one clone to the code under
/// test and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one blob. Does not count as a write.
    pub fn with_blob(key: &str, contents: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        if let Ok(mut blobs) = store.blobs.lock() {
            blobs.insert(key.to_string(), contents.into());
        }
        store
    }

    /// Number of successful writes since creation
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of a blob without going through the async interface
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.blobs
            .lock()
            .map_err(|_| BookwormError::internal("memory blob store lock poisoned"))
    }
}

impl BlobStore for MemoryBlobStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        self.get(key)
    }

    async fn write(&self, key: &str, contents: &[u8]) -> Result<()> {
        validate_key(key)?;
        self.lock()?.insert(key.to_string(), contents.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_blobs() {
        let store = MemoryBlobStore::new();
        let observer = store.clone();

        store.write("books.json", b"[]").await.unwrap();

        assert_eq!(observer.get("books.json").unwrap().unwrap(), b"[]");
        assert_eq!(observer.write_count(), 1);
    }

    #[tokio::test]
    async fn test_with_blob_is_not_a_write() {
        let store = MemoryBlobStore::with_blob("books.json", "not json");

        assert_eq!(store.read("books.json").await.unwrap().unwrap(), b"not json");
        assert_eq!(store.write_count(), 0);
    }
}
