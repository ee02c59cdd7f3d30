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

//! Collection store
//!
//! Loads and saves the whole book collection as one JSON array blob, and
//! seeds the sample set the first time the library is opened.
//!
//! Loading never hides a bad blob: the caller gets a [`LoadOutcome`] and
//! decides what to do with a corrupt one. `Err` means the blob store itself
//! failed.

use crate::error::Result;
use crate::library::book::Book;
use crate::library::seed::sample_books;
use crate::storage::{validate_key, BlobStore};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Default blob name of the collection
pub const DEFAULT_COLLECTION_KEY: &str = "books.json";

/// Suffix appended to the key when a corrupt blob is backed up
pub const CORRUPT_BACKUP_SUFFIX: &str = ".corrupt";

/// Result of reading the collection blob
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No blob existed; the sample set was written and returned
    Seeded(Vec<Book>),
    /// Blob parsed into a non-empty collection
    Loaded(Vec<Book>),
    /// Blob exists and holds nothing
    Empty,
    /// Blob exists but is not a valid collection
    Corrupt { reason: String },
}

impl LoadOutcome {
    /// Books carried by the outcome, empty for `Empty` and `Corrupt`
    pub fn books(&self) -> &[Book] {
        match self {
            LoadOutcome::Seeded(books) | LoadOutcome::Loaded(books) => books,
            LoadOutcome::Empty | LoadOutcome::Corrupt { .. } => &[],
        }
    }

    pub fn into_books(self) -> Vec<Book> {
        match self {
            LoadOutcome::Seeded(books) | LoadOutcome::Loaded(books) => books,
            LoadOutcome::Empty | LoadOutcome::Corrupt { .. } => Vec::new(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadOutcome::Corrupt { .. })
    }

    /// Short name used in logs and bridge responses
    pub fn label(&self) -> &'static str {
        match self {
            LoadOutcome::Seeded(_) => "seeded",
            LoadOutcome::Loaded(_) => "loaded",
            LoadOutcome::Empty => "empty",
            LoadOutcome::Corrupt { .. } => "corrupt",
        }
    }
}

/// Reads and writes the collection blob through a [`BlobStore`]
#[derive(Debug, Clone)]
pub struct CollectionStore<S> {
    store: S,
    key: String,
}

impl<S: BlobStore> CollectionStore<S> {
    /// Store using the default `books.json` key
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: DEFAULT_COLLECTION_KEY.to_string(),
        }
    }

    /// Store using a custom blob key
    pub fn with_key(store: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { store, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying blob store
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Read the collection, seeding it if the blob has never been written
    pub async fn load(&self) -> Result<LoadOutcome> {
        let bytes = match self.store.read(&self.key).await? {
            Some(bytes) => bytes,
            None => {
                let books = self.seed().await?;
                return Ok(LoadOutcome::Seeded(books));
            }
        };

        let outcome = decode(&bytes);
        match &outcome {
            LoadOutcome::Corrupt { reason } => {
                warn!(key = %self.key, store = %self.store.describe(), %reason, "Collection blob is corrupt");
            }
            other => {
                debug!(
                    key = %self.key,
                    outcome = other.label(),
                    books = other.books().len(),
                    "Loaded collection"
                );
            }
        }
        Ok(outcome)
    }

    /// Read the collection, treating a corrupt blob as an empty list
    pub async fn load_or_empty(&self) -> Result<Vec<Book>> {
        Ok(self.load().await?.into_books())
    }

    /// Serialize the full collection and overwrite the blob
    pub async fn save(&self, books: &[Book]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(books)?;
        self.store.write(&self.key, &bytes).await?;

        debug!(key = %self.key, books = books.len(), "Saved collection");
        Ok(())
    }

    /// Write the sample set and return it
    pub async fn seed(&self) -> Result<Vec<Book>> {
        let books = sample_books();
        self.save(&books).await?;

        info!(
            key = %self.key,
            store = %self.store.describe(),
            books = books.len(),
            "Seeded collection with sample books"
        );
        Ok(books)
    }

    /// Copy the current blob to `<key>.corrupt` and return the backup key
    ///
    /// Returns `None` when there is nothing to back up.
    pub async fn backup_corrupt(&self) -> Result<Option<String>> {
        let Some(bytes) = self.store.read(&self.key).await? else {
            return Ok(None);
        };

        let backup_key = format!("{}{}", self.key, CORRUPT_BACKUP_SUFFIX);
        self.store.write(&backup_key, &bytes).await?;

        warn!(key = %self.key, backup = %backup_key, "Backed up corrupt collection blob");
        Ok(Some(backup_key))
    }
}

/// Interpret raw blob bytes
fn decode(bytes: &[u8]) -> LoadOutcome {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            return LoadOutcome::Corrupt {
                reason: format!("not UTF-8: {}", e),
            }
        }
    };

    if text.trim().is_empty() {
        return LoadOutcome::Empty;
    }

    let books: Option<Vec<Book>> = match serde_json::from_str(text) {
        Ok(books) => books,
        Err(e) => {
            return LoadOutcome::Corrupt {
                reason: e.to_string(),
            }
        }
    };

    // A literal `null` is read the same as an empty array
    let books = books.unwrap_or_default();
    if books.is_empty() {
        return LoadOutcome::Empty;
    }

    let mut seen = HashSet::with_capacity(books.len());
    for book in &books {
        if !seen.insert(book.id) {
            return LoadOutcome::Corrupt {
                reason: format!("duplicate book id {}", book.id),
            };
        }
    }

    LoadOutcome::Loaded(books)
}
