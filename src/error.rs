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

//! Error types for Bookworm
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are grouped by domain (validation, lookup, store, configuration) so
//! that the host UI can decide how to present them.
//!
//! ## Failure classes
//!
//! - Validation rejection (add with a missing title/author/cover) → `MissingRequiredField`
//! - Lookup miss (edit/view by unknown id) → `BookNotFound`
//! - Unreadable persisted collection → `CorruptStore`
//! - Blob collaborator failures → `FileIoError`, `MigrationFailed`, `IoError`, `SqlxError`
//!
//! None of these are fatal to the process. The UI degrades to an unchanged
//! or empty state and shows `user_message()`.

use thiserror::Error;

/// Result type alias using our BookwormError type
pub type Result<T> = std::result::Result<T, BookwormError>;

/// Main error type for Bookworm
#[derive(Error, Debug)]
pub enum BookwormError {
    // ===== Validation Errors =====

    /// Required field is empty on book creation
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ===== Lookup Errors =====

    /// No book with the given id exists in the collection
    #[error("Book not found: {0}")]
    BookNotFound(u32),

    // ===== Store Errors =====

    /// Persisted blob exists but could not be decoded
    #[error("Corrupt store '{key}': {reason}")]
    CorruptStore {
        key: String,
        reason: String,
    },

    /// Blob key is not usable as a storage name
    #[error("Invalid store key: {0}")]
    InvalidStoreKey(String),

    /// Generic file I/O error from the file backend
    #[error("File I/O error: {0}")]
    FileIoError(String),

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    // ===== Configuration Errors =====

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Tracing subscriber could not be installed
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    // ===== General Errors =====

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    InternalError(String),

    // ===== External Library Errors =====

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JNI bridge error (Android only)
    #[error("JNI error: {0}")]
    #[cfg(target_os = "android")]
    JniError(String),
}

// Helper methods for creating common errors
impl BookwormError {
    /// Create a BookNotFound error for an id
    pub fn not_found(id: u32) -> Self {
        BookwormError::BookNotFound(id)
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        BookwormError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        BookwormError::InternalError(message.into())
    }

    /// Create a CorruptStore error
    pub fn corrupt<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        BookwormError::CorruptStore {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Check if error is a rejected input (the caller stays on the same screen)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            BookwormError::MissingRequiredField(_) | BookwormError::InvalidInput(_)
        )
    }

    /// Check if error is a lookup miss
    pub fn is_not_found(&self) -> bool {
        matches!(self, BookwormError::BookNotFound(_))
    }

    /// Check if error came from the persistence layer
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            BookwormError::CorruptStore { .. }
                | BookwormError::InvalidStoreKey(_)
                | BookwormError::FileIoError(_)
                | BookwormError::MigrationFailed(_)
                | BookwormError::SqlxError(_)
                | BookwormError::IoError(_)
        )
    }

    /// Short machine-readable category, used in bridge responses
    pub fn kind(&self) -> &'static str {
        if self.is_validation_error() {
            "validation"
        } else if self.is_not_found() {
            "not_found"
        } else if matches!(self, BookwormError::CorruptStore { .. }) {
            "corrupt_store"
        } else if self.is_storage_error() {
            "storage"
        } else if matches!(
            self,
            BookwormError::InvalidConfiguration(_) | BookwormError::LoggingInit(_)
        ) {
            "configuration"
        } else {
            "internal"
        }
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            BookwormError::BookNotFound(_) => "Book not found".to_string(),
            BookwormError::MissingRequiredField(field) => {
                format!("Please fill in the {} field before saving.", field.replace('_', " "))
            }
            BookwormError::CorruptStore { .. } => {
                "Your saved library could not be read. You can reset it to the sample books or start over.".to_string()
            }
            BookwormError::FileIoError(_) | BookwormError::IoError(_) => {
                "Your library could not be saved. Please check available storage and try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}
