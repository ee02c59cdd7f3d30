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

//! Book entity
//!
//! One tracked library entry plus the two shapes used to create and edit it:
//! - [`NewBook`] - fields entered on the add screen (id and date are assigned by the library)
//! - [`BookUpdate`] - partial edit applied in place by the edit screen
//!
//! # Persisted layout
//! Field names are serialized in camelCase and match the blob format exactly:
//! `id`, `title`, `author`, `imageUrl`, `userRating`, `dateAdded`, `review`,
//! `totalPages`, `pagesRead`, `genre`, `description`, `authorBio`, `userReview`.
//!
//! `dateAdded` is a structured UTC timestamp. It is written as RFC 3339 and
//! read back from RFC 3339, `YYYY-MM-DD HH:MM:SS` or plain `YYYY-MM-DD`
//! (zero padding optional), which is what older blobs contain.

use crate::error::{BookwormError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Book identifier, unique within a collection
pub type BookId = u32;

/// Highest rating a user can give
pub const MAX_RATING: f32 = 5.0;

/// Clamp a rating into [0.0, 5.0] and round it to the 0.1 slider step
///
/// This mirrors the rating slider. The core stores whatever it is given.
pub fn snap_rating(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    (value.clamp(0.0, MAX_RATING) * 10.0).round() / 10.0
}

/// One library entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub image_url: String,
    #[serde(default)]
    pub user_rating: f32,
    #[serde(with = "date_added")]
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub total_pages: u32,
    /// Not validated against `total_pages`
    #[serde(default)]
    pub pages_read: u32,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author_bio: String,
    #[serde(default)]
    pub user_review: String,
}

impl Book {
    /// Apply an edit in place. `id` and `date_added` are never touched.
    pub fn apply(&mut self, update: BookUpdate) {
        let BookUpdate {
            title,
            author,
            image_url,
            user_rating,
            review,
            total_pages,
            pages_read,
            genre,
            description,
            author_bio,
            user_review,
        } = update;

        if let Some(v) = title {
            self.title = v;
        }
        if let Some(v) = author {
            self.author = v;
        }
        if let Some(v) = image_url {
            self.image_url = v;
        }
        if let Some(v) = user_rating {
            self.user_rating = v;
        }
        if let Some(v) = review {
            self.review = v;
        }
        if let Some(v) = total_pages {
            self.total_pages = v;
        }
        if let Some(v) = pages_read {
            self.pages_read = v;
        }
        if let Some(v) = genre {
            self.genre = v;
        }
        if let Some(v) = description {
            self.description = v;
        }
        if let Some(v) = author_bio {
            self.author_bio = v;
        }
        if let Some(v) = user_review {
            self.user_review = v;
        }
    }
}

/// Fields entered when adding a book
///
/// `title`, `author` and `image_url` are required; everything else defaults
/// to zero or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub image_url: String,
    pub user_rating: f32,
    pub review: String,
    pub total_pages: u32,
    pub pages_read: u32,
    pub genre: String,
    pub description: String,
    pub author_bio: String,
    pub user_review: String,
}

impl NewBook {
    /// Create a draft with the three required fields
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            image_url: image_url.into(),
            ..Self::default()
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.user_rating = rating;
        self
    }

    pub fn with_pages(mut self, total_pages: u32, pages_read: u32) -> Self {
        self.total_pages = total_pages;
        self.pages_read = pages_read;
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_author_bio(mut self, author_bio: impl Into<String>) -> Self {
        self.author_bio = author_bio.into();
        self
    }

    pub fn with_review(mut self, review: impl Into<String>) -> Self {
        self.review = review.into();
        self
    }

    pub fn with_user_review(mut self, user_review: impl Into<String>) -> Self {
        self.user_review = user_review.into();
        self
    }

    /// Presence check on the required fields. Blank counts as empty.
    ///
    /// Also rejects a non-finite rating, which JSON cannot represent.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("author", &self.author),
            ("image_url", &self.image_url),
        ] {
            if value.trim().is_empty() {
                return Err(BookwormError::MissingRequiredField(field.to_string()));
            }
        }
        check_rating(self.user_rating)
    }

    /// Turn the draft into a stored entry
    pub(crate) fn into_book(self, id: BookId, date_added: DateTime<Utc>) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            image_url: self.image_url,
            user_rating: self.user_rating,
            date_added,
            review: self.review,
            total_pages: self.total_pages,
            pages_read: self.pages_read,
            genre: self.genre,
            description: self.description,
            author_bio: self.author_bio,
            user_review: self.user_review,
        }
    }
}

/// Partial edit of an existing book; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookUpdate {
    pub title: Option<String>,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub user_rating: Option<f32>,
    pub review: Option<String>,
    pub total_pages: Option<u32>,
    pub pages_read: Option<u32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub author_bio: Option<String>,
    pub user_review: Option<String>,
}

impl BookUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn user_rating(mut self, rating: f32) -> Self {
        self.user_rating = Some(rating);
        self
    }

    pub fn review(mut self, review: impl Into<String>) -> Self {
        self.review = Some(review.into());
        self
    }

    pub fn total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    pub fn pages_read(mut self, pages_read: u32) -> Self {
        self.pages_read = Some(pages_read);
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn author_bio(mut self, author_bio: impl Into<String>) -> Self {
        self.author_bio = Some(author_bio.into());
        self
    }

    pub fn user_review(mut self, user_review: impl Into<String>) -> Self {
        self.user_review = Some(user_review.into());
        self
    }

    /// Reject values that could not be persisted. Presence is not checked.
    pub fn validate(&self) -> Result<()> {
        match self.user_rating {
            Some(rating) => check_rating(rating),
            None => Ok(()),
        }
    }

    /// True when the edit would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse a stored `dateAdded` value
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-M-D` (midnight UTC).
pub fn parse_date_added(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    let mut parts = raw.split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }

    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Format a `dateAdded` value the way it is persisted
///
/// Sub-second digits are written only when present, so whole-second stamps
/// stay short and `parse_date_added(format_date_added(t)) == t` for every `t`.
pub fn format_date_added(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Ratings must be finite to survive a JSON round trip
fn check_rating(rating: f32) -> Result<()> {
    if rating.is_finite() {
        Ok(())
    } else {
        Err(BookwormError::invalid_input(format!(
            "userRating must be a finite number, got {}",
            rating
        )))
    }
}

/// serde adapter for `Book::date_added`
pub(crate) mod date_added {
    use super::{format_date_added, parse_date_added};
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_date_added(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date_added(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised dateAdded '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Book {
        NewBook::new("Dune", "Frank Herbert", "https://covers/dune.jpg")
            .with_rating(4.2)
            .with_pages(412, 100)
            .into_book(7, parse_date_added("2024-10-01").unwrap())
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();

        for key in [
            "id", "title", "author", "imageUrl", "userRating", "dateAdded", "review",
            "totalPages", "pagesRead", "genre", "description", "authorBio", "userReview",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
        assert_eq!(obj.len(), 13);
        assert_eq!(json["dateAdded"], "2024-10-01T00:00:00Z");
    }

    #[test]
    fn test_deserialize_legacy_date_and_defaults() {
        let json = r#"{"id":3,"title":"Emma","author":"Jane Austen","imageUrl":"emma.png","dateAdded":"2024-9-1"}"#;
        let book: Book = serde_json::from_str(json).unwrap();

        assert_eq!(book.id, 3);
        assert_eq!(book.user_rating, 0.0);
        assert_eq!(book.total_pages, 0);
        assert_eq!(book.review, "");
        assert_eq!(book.date_added, parse_date_added("2024-09-01").unwrap());
    }

    #[test]
    fn test_deserialize_rejects_garbage_date() {
        let json = r#"{"id":3,"title":"Emma","author":"Jane Austen","imageUrl":"emma.png","dateAdded":"last tuesday"}"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_parse_date_added_forms() {
        let a = parse_date_added("2024-10-01T08:30:00Z").unwrap();
        let b = parse_date_added("2024-10-01 08:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_date_added("2024-13-01").is_none());
        assert!(parse_date_added("2024-10-01-02").is_none());
        assert!(parse_date_added("2024-9-1").unwrap() < parse_date_added("2024-10-1").unwrap());
    }

    #[test]
    fn test_validate_required_fields() {
        assert!(NewBook::new("T", "A", "I").validate().is_ok());

        let err = NewBook::new("", "A", "I").validate().unwrap_err();
        assert!(matches!(err, BookwormError::MissingRequiredField(ref f) if f == "title"));

        let err = NewBook::new("T", "   ", "I").validate().unwrap_err();
        assert!(matches!(err, BookwormError::MissingRequiredField(ref f) if f == "author"));

        let err = NewBook::new("T", "A", "").validate().unwrap_err();
        assert!(matches!(err, BookwormError::MissingRequiredField(ref f) if f == "image_url"));
    }

    #[test]
    fn test_apply_keeps_identity_fields() {
        let mut book = sample();
        let date = book.date_added;

        book.apply(
            BookUpdate::new()
                .title("Dune Messiah")
                .user_rating(3.5)
                .pages_read(500)
                .user_review("Slower than the first"),
        );

        assert_eq!(book.id, 7);
        assert_eq!(book.date_added, date);
        assert_eq!(book.title, "Dune Messiah");
        assert_eq!(book.author, "Frank Herbert");
        assert_eq!(book.user_rating, 3.5);
        // Not clamped against total_pages
        assert_eq!(book.pages_read, 500);
        assert_eq!(book.user_review, "Slower than the first");
    }

    #[test]
    fn test_sub_second_dates_survive_serialization() {
        let mut book = sample();
        book.date_added = parse_date_added("2026-10-18T08:53:40.614225010Z").unwrap();

        let json = serde_json::to_string(&book).unwrap();
        assert!(json.contains("2026-10-18T08:53:40.614225010Z"));

        let back: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }

    #[test]
    fn test_non_finite_rating_rejected() {
        let huge: NewBook = serde_json::from_str(
            r#"{"title":"T","author":"A","imageUrl":"I","userRating":1e39}"#,
        )
        .unwrap();
        assert!(matches!(huge.validate(), Err(BookwormError::InvalidInput(_))));

        let nan = NewBook::new("T", "A", "I").with_rating(f32::NAN);
        assert!(matches!(nan.validate(), Err(BookwormError::InvalidInput(_))));

        // Out of slider range is still storable
        assert!(NewBook::new("T", "A", "I").with_rating(7.5).validate().is_ok());

        let update: BookUpdate = serde_json::from_str(r#"{"userRating":1e39}"#).unwrap();
        assert!(matches!(update.validate(), Err(BookwormError::InvalidInput(_))));
        assert!(BookUpdate::new().user_rating(4.5).validate().is_ok());
        assert!(BookUpdate::new().title("").validate().is_ok());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(BookUpdate::new().is_empty());
        assert!(!BookUpdate::new().genre("Fantasy").is_empty());
    }

    #[test]
    fn test_snap_rating() {
        assert_eq!(snap_rating(4.26), 4.3);
        assert_eq!(snap_rating(7.0), 5.0);
        assert_eq!(snap_rating(-1.0), 0.0);
        assert_eq!(snap_rating(f32::NAN), 0.0);
    }
}
