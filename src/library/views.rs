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

//! Derived views over the collection
//!
//! Pure projections recomputed on demand from the current in-memory list.
//! Nothing here is cached and nothing here mutates.

use crate::library::book::Book;
use serde::Serialize;
use std::cmp::Ordering;

/// Size of the "top books" strip on the home screen
pub const DEFAULT_TOP_RATED_COUNT: usize = 3;

/// Ranking used by [`top_rated`]: rating descending, then newest first
pub fn rank_order(a: &Book, b: &Book) -> Ordering {
    b.user_rating
        .total_cmp(&a.user_rating)
        .then_with(|| b.date_added.cmp(&a.date_added))
}

/// The `n` highest-rated books, ties broken by the most recently added
///
/// Books that tie on both keys keep their collection order.
pub fn top_rated(books: &[Book], n: usize) -> Vec<&Book> {
    let mut ranked: Vec<&Book> = books.iter().collect();
    ranked.sort_by(|a, b| rank_order(a, b));
    ranked.truncate(n);
    ranked
}

/// Other books by the same author as `current`, in collection order
///
/// Authors are compared exactly. `current` itself is excluded by id.
pub fn books_by_author<'a>(books: &'a [Book], current: &Book) -> Vec<&'a Book> {
    books
        .iter()
        .filter(|book| book.author == current.author && book.id != current.id)
        .collect()
}

/// `pages_read / total_pages`, or 0 when the page count is unknown
///
/// Not clamped: a book with more pages read than it has yields a value above 1.
pub fn progress_fraction(book: &Book) -> f32 {
    if book.total_pages > 0 {
        book.pages_read as f32 / book.total_pages as f32
    } else {
        0.0
    }
}

/// Reading progress as shown on the details screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub pages_read: u32,
    pub total_pages: u32,
    /// Raw fraction, may exceed 1.0
    pub fraction: f32,
}

impl ReadingProgress {
    pub fn of(book: &Book) -> Self {
        Self {
            pages_read: book.pages_read,
            total_pages: book.total_pages,
            fraction: progress_fraction(book),
        }
    }

    /// Fraction limited to [0, 1] for progress bars
    pub fn clamped_fraction(&self) -> f32 {
        self.fraction.clamp(0.0, 1.0)
    }

    /// Whole-number percentage of the clamped fraction
    pub fn percent(&self) -> u32 {
        (self.clamped_fraction() * 100.0).round() as u32
    }

    pub fn is_finished(&self) -> bool {
        self.total_pages > 0 && self.pages_read >= self.total_pages
    }

    /// More pages recorded than the book has
    pub fn is_overflowing(&self) -> bool {
        self.pages_read > self.total_pages && self.total_pages > 0
    }

    /// "150 / 328" label
    pub fn label(&self) -> String {
        format!("{} / {}", self.pages_read, self.total_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::book::{parse_date_added, NewBook};

    fn book(id: u32, author: &str, rating: f32, date: &str) -> Book {
        NewBook::new(format!("Book {}", id), author, "cover.png")
            .with_rating(rating)
            .into_book(id, parse_date_added(date).unwrap())
    }

    #[test]
    fn test_top_rated_tie_broken_by_date() {
        let books = vec![
            book(0, "X", 4.0, "2024-12-01"),
            book(1, "X", 5.0, "2024-09-01"),
            book(2, "X", 5.0, "2024-10-01"),
        ];

        let ids: Vec<u32> = top_rated(&books, 2).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_top_rated_compares_dates_chronologically() {
        // "2024-9-1" sorts after "2024-10-1" as a string
        let books = vec![
            book(0, "X", 3.0, "2024-9-1"),
            book(1, "X", 3.0, "2024-10-1"),
        ];

        let ids: Vec<u32> = top_rated(&books, 2).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn test_top_rated_short_collection() {
        let books = vec![book(0, "X", 1.0, "2024-01-01")];
        assert_eq!(top_rated(&books, DEFAULT_TOP_RATED_COUNT).len(), 1);
        assert!(top_rated(&[], 3).is_empty());
        assert!(top_rated(&books, 0).is_empty());
    }

    #[test]
    fn test_books_by_author_excludes_self() {
        let books = vec![
            book(0, "Rowling", 5.0, "2024-01-01"),
            book(1, "Tolkien", 5.0, "2024-01-01"),
            book(2, "Rowling", 4.0, "2024-01-01"),
            book(3, "Rowling", 3.0, "2024-01-01"),
        ];

        let ids: Vec<u32> = books_by_author(&books, &books[2]).iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![0, 3]);

        assert!(books_by_author(&books, &books[1]).is_empty());
    }

    #[test]
    fn test_books_by_author_is_exact_match() {
        let books = vec![
            book(0, "Jane Austen", 5.0, "2024-01-01"),
            book(1, "jane austen", 5.0, "2024-01-01"),
        ];
        assert!(books_by_author(&books, &books[0]).is_empty());
    }

    #[test]
    fn test_progress_fraction() {
        let mut b = book(0, "X", 1.0, "2024-01-01");
        b.total_pages = 0;
        b.pages_read = 40;
        assert_eq!(progress_fraction(&b), 0.0);

        b.total_pages = 200;
        b.pages_read = 50;
        assert_eq!(progress_fraction(&b), 0.25);

        b.pages_read = 300;
        assert_eq!(progress_fraction(&b), 1.5);
    }

    #[test]
    fn test_reading_progress() {
        let mut b = book(0, "X", 1.0, "2024-01-01");
        b.total_pages = 200;
        b.pages_read = 300;

        let progress = ReadingProgress::of(&b);
        assert_eq!(progress.fraction, 1.5);
        assert_eq!(progress.clamped_fraction(), 1.0);
        assert_eq!(progress.percent(), 100);
        assert!(progress.is_finished());
        assert!(progress.is_overflowing());
        assert_eq!(progress.label(), "300 / 200");
    }
}
