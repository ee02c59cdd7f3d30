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

//! Book collection domain
//!
//! - [`book`] - the entity and its add/edit shapes
//! - [`collection`] - the owned collection with add and update
//! - [`views`] - pure projections (top rated, same author, progress)
//! - [`seed`] - sample books written on first run

pub mod book;
pub mod collection;
pub mod seed;
pub mod views;

// Re-export commonly used types
pub use book::{parse_date_added, snap_rating, Book, BookId, BookUpdate, NewBook, MAX_RATING};
pub use collection::{BookDetails, Library, OpenReport};
pub use seed::{sample_books, SAMPLE_BOOK_COUNT};
pub use views::{books_by_author, progress_fraction, top_rated, ReadingProgress, DEFAULT_TOP_RATED_COUNT};
