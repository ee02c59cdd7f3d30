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

//! The book collection
//!
//! [`Library`] owns the in-memory collection and the store it came from.
//! Screens receive a reference to it instead of reaching for a global list;
//! every mutation goes through a method that also saves the full collection.
//!
//! # Example
//! ```rust,no_run
//! use bookworm_core::config::RecoveryPolicy;
//! use bookworm_core::library::{Library, NewBook};
//! use bookworm_core::storage::{CollectionStore, FileBlobStore};
//!
//! # async fn example() -> bookworm_core::Result<()> {
//! let store = CollectionStore::new(FileBlobStore::new("./bookworm-data".into()));
//! let (mut library, report) = Library::open(store, RecoveryPolicy::StartEmpty).await?;
//! println!("opened: {} ({} books)", report.outcome, report.book_count);
//!
//! let book = library
//!     .add_book(NewBook::new("Dune", "Frank Herbert", "https://covers/dune.jpg"))
//!     .await?;
//! for top in library.top_rated() {
//!     println!("{} - {}", top.title, top.user_rating);
//! }
//! # let _ = book;
//! # Ok(())
//! # }
//! ```

use crate::config::{LibraryConfig, RecoveryPolicy};
use crate::error::{BookwormError, Result};
use crate::library::book::{Book, BookId, BookUpdate, NewBook};
use crate::library::views::{self, ReadingProgress, DEFAULT_TOP_RATED_COUNT};
use crate::storage::{BlobStore, CollectionStore, LoadOutcome, StoreBackend};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

/// What happened when the library was opened
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenReport {
    /// `seeded`, `loaded`, `empty` or `corrupt`
    pub outcome: String,
    /// Books in memory after recovery
    pub book_count: usize,
    /// Set when the blob could not be read
    pub corrupt_reason: Option<String>,
    /// Key the corrupt blob was copied to under `RecoveryPolicy::Reset`
    pub backup_key: Option<String>,
}

/// Everything the detail screens show for one book
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    pub book: Book,
    pub progress: ReadingProgress,
    pub more_by_author: Vec<Book>,
}

/// In-memory collection bound to its store
#[derive(Debug)]
pub struct Library<S> {
    store: CollectionStore<S>,
    books: Vec<Book>,
    top_rated_count: usize,
}

impl<S: BlobStore> Library<S> {
    /// Load the collection, applying `policy` if the blob is corrupt
    pub async fn open(store: CollectionStore<S>, policy: RecoveryPolicy) -> Result<(Self, OpenReport)> {
        let outcome = store.load().await?;
        let label = outcome.label().to_string();

        let (books, corrupt_reason, backup_key) = match outcome {
            LoadOutcome::Corrupt { reason } => match policy {
                RecoveryPolicy::Abort => {
                    error!(key = store.key(), %reason, "Refusing to open corrupt collection");
                    return Err(BookwormError::corrupt(store.key(), reason));
                }
                RecoveryPolicy::StartEmpty => {
                    // The next save overwrites the blob, so keep a copy first
                    let backup_key = store.backup_corrupt().await?;
                    warn!(
                        key = store.key(),
                        backup = backup_key.as_deref().unwrap_or("-"),
                        %reason,
                        "Starting with an empty collection"
                    );
                    (Vec::new(), Some(reason), backup_key)
                }
                RecoveryPolicy::Reset => {
                    let backup_key = store.backup_corrupt().await?;
                    let books = store.seed().await?;
                    warn!(
                        key = store.key(),
                        backup = backup_key.as_deref().unwrap_or("-"),
                        %reason,
                        "Reset corrupt collection to sample books"
                    );
                    (books, Some(reason), backup_key)
                }
            },
            other => (other.into_books(), None, None),
        };

        let report = OpenReport {
            outcome: label,
            book_count: books.len(),
            corrupt_reason,
            backup_key,
        };

        info!(
            key = store.key(),
            store = %store.backend().describe(),
            outcome = %report.outcome,
            books = report.book_count,
            "Opened library"
        );

        let library = Self {
            store,
            books,
            top_rated_count: DEFAULT_TOP_RATED_COUNT,
        };
        Ok((library, report))
    }

    /// Wrap an already loaded collection. Nothing is read or written.
    pub fn from_books(store: CollectionStore<S>, books: Vec<Book>) -> Self {
        Self {
            store,
            books,
            top_rated_count: DEFAULT_TOP_RATED_COUNT,
        }
    }

    /// Change the length of [`Library::top_rated`]
    pub fn with_top_rated_count(mut self, count: usize) -> Self {
        self.top_rated_count = count;
        self
    }

    /// All books in collection order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Look up a book, failing with `BookNotFound`
    pub fn require(&self, id: BookId) -> Result<&Book> {
        self.get(id).ok_or_else(|| BookwormError::not_found(id))
    }

    pub fn store(&self) -> &CollectionStore<S> {
        &self.store
    }

    /// Home-screen top list
    pub fn top_rated(&self) -> Vec<&Book> {
        views::top_rated(&self.books, self.top_rated_count)
    }

    pub fn top_rated_n(&self, n: usize) -> Vec<&Book> {
        views::top_rated(&self.books, n)
    }

    /// Other books by the author of `id`
    pub fn books_by_author(&self, id: BookId) -> Result<Vec<&Book>> {
        let current = self.require(id)?;
        Ok(views::books_by_author(&self.books, current))
    }

    /// Book, reading progress and same-author list in one call
    pub fn details(&self, id: BookId) -> Result<BookDetails> {
        let book = self.require(id)?;
        Ok(BookDetails {
            book: book.clone(),
            progress: ReadingProgress::of(book),
            more_by_author: views::books_by_author(&self.books, book)
                .into_iter()
                .cloned()
                .collect(),
        })
    }

    /// Id the next added book will get
    ///
    /// The collection size, unless some book already holds that id.
    pub fn next_id(&self) -> Result<BookId> {
        let candidate = BookId::try_from(self.books.len()).map_err(|_| {
            BookwormError::internal(format!("collection of {} books has no free id", self.books.len()))
        })?;
        if self.get(candidate).is_none() {
            return Ok(candidate);
        }
        let max = self.books.iter().map(|book| book.id).max().unwrap_or(candidate);
        max.checked_add(1)
            .ok_or_else(|| BookwormError::internal("book ids exhausted"))
    }

    /// Add a book stamped with the current time
    pub async fn add_book(&mut self, draft: NewBook) -> Result<Book> {
        self.add_book_at(draft, Utc::now()).await
    }

    /// Add a book with an explicit `dateAdded`
    ///
    /// Rejected drafts leave the collection unchanged. If the save fails the
    /// book is removed again and the error returned.
    pub async fn add_book_at(&mut self, draft: NewBook, date_added: DateTime<Utc>) -> Result<Book> {
        if let Err(e) = draft.validate() {
            warn!(error = %e, "Rejected new book");
            return Err(e);
        }

        let book = draft.into_book(self.next_id()?, date_added);
        self.books.push(book.clone());

        if let Err(e) = self.persist().await {
            self.books.pop();
            error!(id = book.id, error = %e, "Failed to save new book");
            return Err(e);
        }

        info!(id = book.id, title = %book.title, "Added book");
        Ok(book)
    }

    /// Apply an edit to the book with `id` and save
    ///
    /// No presence checks are made on the edited fields, but a value that
    /// could not be saved (a non-finite rating) is rejected up front. If the
    /// save fails the previous values are restored.
    pub async fn update_book(&mut self, id: BookId, update: BookUpdate) -> Result<Book> {
        if let Err(e) = update.validate() {
            warn!(id, error = %e, "Rejected book edit");
            return Err(e);
        }

        let Some(index) = self.books.iter().position(|book| book.id == id) else {
            warn!(id, "Update for unknown book");
            return Err(BookwormError::not_found(id));
        };

        let previous = self.books[index].clone();
        self.books[index].apply(update);

        if let Err(e) = self.persist().await {
            self.books[index] = previous;
            error!(id, error = %e, "Failed to save updated book");
            return Err(e);
        }

        info!(id, "Updated book");
        Ok(self.books[index].clone())
    }

    /// Save the full collection
    pub async fn persist(&self) -> Result<()> {
        self.store.save(&self.books).await
    }
}

impl Library<StoreBackend> {
    /// Open the backend and collection described by `config`
    pub async fn from_config(config: &LibraryConfig) -> Result<(Self, OpenReport)> {
        config.validate()?;

        let backend = StoreBackend::open(config).await?;
        let store = CollectionStore::with_key(backend, config.collection_key.clone())?;
        let (library, report) = Self::open(store, config.recovery).await?;

        Ok((library.with_top_rated_count(config.top_rated_count), report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::book::parse_date_added;
    use crate::library::seed::SAMPLE_BOOK_COUNT;
    use crate::storage::MemoryBlobStore;

    async fn seeded() -> (Library<MemoryBlobStore>, MemoryBlobStore) {
        let memory = MemoryBlobStore::new();
        let (library, report) = Library::open(CollectionStore::new(memory.clone()), RecoveryPolicy::Abort)
            .await
            .unwrap();
        assert_eq!(report.outcome, "seeded");
        (library, memory)
    }

    #[tokio::test]
    async fn test_open_seeds_sample_books() {
        let (library, memory) = seeded().await;

        assert_eq!(library.len(), SAMPLE_BOOK_COUNT);
        assert_eq!(library.top_rated().len(), 3);
        assert_eq!(memory.write_count(), 1);
    }

    #[tokio::test]
    async fn test_add_assigns_sequential_ids() {
        let (mut library, _) = seeded().await;

        let first = library
            .add_book(NewBook::new("Dune", "Frank Herbert", "dune.png"))
            .await
            .unwrap();
        let second = library
            .add_book(NewBook::new("Emma", "Jane Austen", "emma.png"))
            .await
            .unwrap();

        assert_eq!(first.id, 16);
        assert_eq!(second.id, 17);
        assert_eq!(library.len(), 18);
    }

    #[tokio::test]
    async fn test_add_rejects_missing_fields() {
        let (mut library, memory) = seeded().await;

        let err = library
            .add_book(NewBook::new("", "X", "Y"))
            .await
            .unwrap_err();

        assert!(err.is_validation_error());
        assert_eq!(library.len(), SAMPLE_BOOK_COUNT);
        assert_eq!(memory.write_count(), 1);
    }

    #[tokio::test]
    async fn test_add_persists_full_collection() {
        let (mut library, memory) = seeded().await;
        let date = parse_date_added("2025-01-15").unwrap();

        library
            .add_book_at(NewBook::new("Dune", "Frank Herbert", "dune.png").with_rating(4.5), date)
            .await
            .unwrap();

        let stored: Vec<Book> = serde_json::from_slice(&memory.get("books.json").unwrap().unwrap()).unwrap();
        assert_eq!(stored.len(), SAMPLE_BOOK_COUNT + 1);
        assert_eq!(stored.last().unwrap().date_added, date);
    }

    #[tokio::test]
    async fn test_next_id_skips_taken_id() {
        let store = CollectionStore::new(MemoryBlobStore::new());
        let date = parse_date_added("2024-01-01").unwrap();
        let books = vec![
            NewBook::new("A", "X", "a.png").into_book(0, date),
            NewBook::new("B", "X", "b.png").into_book(2, date),
        ];
        let library = Library::from_books(store, books);

        assert_eq!(library.next_id().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_next_id_exhausted() {
        let store = CollectionStore::new(MemoryBlobStore::new());
        let date = parse_date_added("2024-01-01").unwrap();
        let books = vec![
            NewBook::new("A", "X", "a.png").into_book(2, date),
            NewBook::new("B", "X", "b.png").into_book(BookId::MAX, date),
        ];
        let mut library = Library::from_books(store, books);

        assert!(matches!(library.next_id(), Err(BookwormError::InternalError(_))));
        let err = library
            .add_book(NewBook::new("C", "X", "c.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookwormError::InternalError(_)));
        assert_eq!(library.len(), 2);
    }

    #[tokio::test]
    async fn test_added_book_survives_reopen_exactly() {
        let (mut library, memory) = seeded().await;

        // Stamped with the wall clock, so sub-second digits are present
        let added = library
            .add_book(NewBook::new("Dune", "Frank Herbert", "dune.png").with_rating(4.5))
            .await
            .unwrap();

        let (reopened, report) = Library::open(CollectionStore::new(memory), RecoveryPolicy::Abort)
            .await
            .unwrap();
        assert_eq!(report.outcome, "loaded");
        assert_eq!(reopened.get(added.id), Some(&added));
        assert_eq!(reopened.books(), library.books());
    }

    #[tokio::test]
    async fn test_update_rejects_unstorable_rating() {
        let (mut library, memory) = seeded().await;
        let before = library.get(0).unwrap().clone();

        let update: BookUpdate = serde_json::from_str(r#"{"userRating":1e39,"title":"Renamed"}"#).unwrap();
        let err = library.update_book(0, update).await.unwrap_err();

        assert!(err.is_validation_error());
        assert_eq!(library.get(0), Some(&before));
        assert_eq!(memory.write_count(), 1);

        let (_, report) = Library::open(CollectionStore::new(memory), RecoveryPolicy::Abort)
            .await
            .unwrap();
        assert_eq!(report.outcome, "loaded");
    }

    #[tokio::test]
    async fn test_add_rejects_unstorable_rating() {
        let (mut library, memory) = seeded().await;

        let err = library
            .add_book(NewBook::new("Dune", "Frank Herbert", "dune.png").with_rating(f32::INFINITY))
            .await
            .unwrap_err();

        assert!(err.is_validation_error());
        assert_eq!(library.len(), SAMPLE_BOOK_COUNT);
        assert_eq!(memory.write_count(), 1);
    }

    #[tokio::test]
    async fn test_update_book() {
        let (mut library, memory) = seeded().await;

        let updated = library
            .update_book(0, BookUpdate::new().user_rating(4.0).pages_read(328))
            .await
            .unwrap();

        assert_eq!(updated.user_rating, 4.0);
        assert_eq!(library.get(0).unwrap().pages_read, 328);
        assert_eq!(memory.write_count(), 2);

        let err = library.update_book(99, BookUpdate::new().title("x")).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(memory.write_count(), 2);
    }

    #[tokio::test]
    async fn test_details() {
        let (library, _) = seeded().await;
        let rowling = library
            .books()
            .iter()
            .find(|book| book.author == "J.K. Rowling")
            .unwrap()
            .clone();

        let details = library.details(rowling.id).unwrap();
        assert_eq!(details.book, rowling);
        assert!(!details.more_by_author.is_empty());
        assert!(details.more_by_author.iter().all(|b| b.id != rowling.id && b.author == rowling.author));

        assert!(library.details(404).unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_open_corrupt_policies() {
        let abort = Library::open(
            CollectionStore::new(MemoryBlobStore::with_blob("books.json", "{oops")),
            RecoveryPolicy::Abort,
        )
        .await;
        assert!(matches!(abort, Err(BookwormError::CorruptStore { .. })));

        let memory = MemoryBlobStore::with_blob("books.json", "{oops");
        let (library, report) = Library::open(CollectionStore::new(memory.clone()), RecoveryPolicy::StartEmpty)
            .await
            .unwrap();
        assert!(library.is_empty());
        assert_eq!(report.outcome, "corrupt");
        assert!(report.corrupt_reason.is_some());
        assert_eq!(report.backup_key.as_deref(), Some("books.json.corrupt"));
        assert_eq!(memory.get("books.json.corrupt").unwrap().unwrap(), b"{oops");
        assert_eq!(memory.get("books.json").unwrap().unwrap(), b"{oops");

        let memory = MemoryBlobStore::with_blob("books.json", "{oops");
        let (library, report) = Library::open(CollectionStore::new(memory.clone()), RecoveryPolicy::Reset)
            .await
            .unwrap();
        assert_eq!(library.len(), SAMPLE_BOOK_COUNT);
        assert_eq!(report.backup_key.as_deref(), Some("books.json.corrupt"));
        assert_eq!(memory.get("books.json.corrupt").unwrap().unwrap(), b"{oops");
    }

    #[tokio::test]
    async fn test_start_empty_keeps_corrupt_copy_after_add() {
        let memory = MemoryBlobStore::with_blob("books.json", "[{\"id\": oops");
        let (mut library, _) = Library::open(CollectionStore::new(memory.clone()), RecoveryPolicy::StartEmpty)
            .await
            .unwrap();

        let added = library
            .add_book(NewBook::new("Dune", "Frank Herbert", "dune.png"))
            .await
            .unwrap();
        assert_eq!(added.id, 0);

        let stored: Vec<Book> = serde_json::from_slice(&memory.get("books.json").unwrap().unwrap()).unwrap();
        assert_eq!(stored, vec![added]);
        assert_eq!(
            memory.get("books.json.corrupt").unwrap().unwrap(),
            b"[{\"id\": oops"
        );
    }

    #[tokio::test]
    async fn test_from_config_memory() {
        let config = LibraryConfig::builder()
            .backend(crate::config::StorageBackend::Memory)
            .top_rated_count(5)
            .build()
            .unwrap();

        let (library, report) = Library::from_config(&config).await.unwrap();
        assert_eq!(report.outcome, "seeded");
        assert_eq!(library.top_rated().len(), 5);
    }
}
