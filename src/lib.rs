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

//! Bookworm core
//!
//! Book collection model for the Bookworm reading tracker: the book entity,
//! persistence of the collection as one JSON blob, the derived views the
//! screens render, and the add/edit operations.
//!
//! Hosts reach it through [`bridge`] (JSON commands), the Android JNI
//! exports, the iOS C exports, or the uniffi [`call_core`] function.

uniffi::setup_scaffolding!();

pub mod bridge;
pub mod config;
pub mod error;
pub mod ios_bridge;
pub mod library;
pub mod logging;
pub mod settings;
pub mod storage;

// JNI bridge for Android
#[cfg(target_os = "android")]
mod jni_bridge;

pub use config::{LibraryConfig, RecoveryPolicy, StorageBackend};
pub use error::{BookwormError, Result};
pub use library::{Book, BookDetails, BookId, BookUpdate, Library, NewBook, OpenReport, ReadingProgress};
pub use settings::{ColorScheme, DisplaySettings, SettingsStore, SettingsUpdate};
pub use storage::{BlobStore, CollectionStore, LoadOutcome, StoreBackend};

/// Run a bridge command from generated bindings
#[uniffi::export]
pub fn call_core(command: String, params_json: String) -> String {
    bridge::dispatch(&command, &params_json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_core_unknown_command() {
        let response = call_core("shelve".to_string(), "{}".to_string());
        assert!(response.contains("\"success\":false"));
        assert!(response.contains("Unknown command: shelve"));
    }
}
