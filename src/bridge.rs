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

//! Command handlers shared by the host bridges
//!
//! Every handler takes a JSON parameter string and returns a JSON response
//! string, so the Android, iOS and uniffi surfaces are thin wrappers.
//!
//! # Architecture
//! Kotlin / Swift → (JNI | C ABI | uniffi) → `dispatch` → `Library`
//!
//! Opened libraries live in a process-wide registry keyed by `data_dir`.
//! Each one sits behind an async mutex because hosts may call in from
//! several threads.
//!
//! # Response Format
//! ```json
//! { "success": true, "data": { ... } }
//! ```
//! Or on error:
//! ```json
//! { "success": false, "error": "Book not found: 42", "kind": "not_found", "message": "Book not found" }
//! ```
//! `error` is the diagnostic text, `message` the text to show the user.

use crate::config::LibraryConfig;
use crate::error::{BookwormError, Result};
use crate::library::{BookId, BookUpdate, Library, NewBook, OpenReport};
use crate::logging::{init_logging as install_logging, LoggingConfig};
use crate::settings::{ColorScheme, DisplaySettings, SettingsStore, SettingsUpdate};
use crate::storage::{BlobStore, StoreBackend};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// Lazy static tokio runtime for async operations
lazy_static::lazy_static! {
    static ref RUNTIME: tokio::runtime::Runtime =
        tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    // Opened libraries (data_dir -> handle)
    static ref LIBRARIES: Mutex<HashMap<String, Arc<LibraryHandle>>> =
        Mutex::new(HashMap::new());
}

/// One opened library and its settings store
pub struct LibraryHandle {
    library: tokio::sync::Mutex<Library<StoreBackend>>,
    settings: SettingsStore<StoreBackend>,
    config: LibraryConfig,
    report: OpenReport,
}

impl LibraryHandle {
    async fn open(config: &LibraryConfig) -> Result<Self> {
        let (library, report) = Library::from_config(config).await?;
        let backend = library.store().backend().clone();
        let settings = SettingsStore::with_key(backend, config.settings_key.clone())?;

        Ok(Self {
            library: tokio::sync::Mutex::new(library),
            settings,
            config: config.clone(),
            report,
        })
    }

    /// Open report with the book count brought up to date
    async fn current_report(&self) -> OpenReport {
        OpenReport {
            book_count: self.library.lock().await.len(),
            ..self.report.clone()
        }
    }

    /// Fail unless this handle was opened with `config`
    fn ensure_config(&self, config: &LibraryConfig) -> Result<()> {
        if &self.config == config {
            return Ok(());
        }
        Err(BookwormError::InvalidConfiguration(format!(
            "library at {} is already open with a different configuration; close it first",
            config.data_dir.display()
        )))
    }
}

fn registry() -> Result<std::sync::MutexGuard<'static, HashMap<String, Arc<LibraryHandle>>>> {
    LIBRARIES
        .lock()
        .map_err(|_| BookwormError::internal("library registry lock poisoned"))
}

/// Registered handle for `data_dir`, opening it with defaults if needed
async fn handle_for(data_dir: &str) -> Result<Arc<LibraryHandle>> {
    if let Some(handle) = registry()?.get(data_dir) {
        return Ok(Arc::clone(handle));
    }

    let config = LibraryConfig::with_data_dir(data_dir);
    let handle = Arc::new(LibraryHandle::open(&config).await?);

    // Keep whichever handle won if two callers opened concurrently
    let mut libraries = registry()?;
    let entry = libraries
        .entry(data_dir.to_string())
        .or_insert_with(|| Arc::clone(&handle));
    Ok(Arc::clone(entry))
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Create success response JSON
pub fn success_response<T: Serialize>(data: T) -> String {
    serde_json::json!({
        "success": true,
        "data": data
    })
    .to_string()
}

/// Create error response JSON for a failure that has no user-facing text
pub fn error_response(error: &str, kind: &str) -> String {
    error_json(error, kind, error)
}

/// Create error response JSON from a crate error
pub fn error_to_json(error: &BookwormError) -> String {
    error_json(&error.to_string(), error.kind(), &error.user_message())
}

fn error_json(error: &str, kind: &str, message: &str) -> String {
    serde_json::json!({
        "success": false,
        "error": error,
        "kind": kind,
        "message": message
    })
    .to_string()
}

/// Convert Rust result to JSON response string
pub fn result_to_json<T: Serialize>(result: Result<T>) -> String {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_to_json(&e),
    }
}

/// Wrap a function call with panic catching
pub fn catch_panic<F>(f: F) -> String
where
    F: FnOnce() -> String,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic_err) => {
            let panic_msg = if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else {
                "Unknown panic occurred".to_string()
            };
            error_response(&format!("Rust panic: {}", panic_msg), "internal")
        }
    }
}

/// Run an async handler on the shared runtime and encode its result
fn run<T, F>(future: F) -> String
where
    T: Serialize,
    F: Future<Output = Result<T>>,
{
    catch_panic(|| result_to_json(RUNTIME.block_on(future)))
}

fn parse_params<P: DeserializeOwned>(params_json: &str) -> Result<P> {
    serde_json::from_str(params_json)
        .map_err(|e| BookwormError::invalid_input(format!("Invalid JSON: {}", e)))
}

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Deserialize)]
struct LibraryParams {
    data_dir: String,
}

#[derive(Deserialize)]
struct BookParams {
    data_dir: String,
    id: BookId,
}

#[derive(Deserialize)]
struct TopRatedParams {
    data_dir: String,
    count: Option<usize>,
}

#[derive(Deserialize)]
struct AddBookParams {
    data_dir: String,
    book: NewBook,
}

#[derive(Deserialize)]
struct UpdateBookParams {
    data_dir: String,
    id: BookId,
    update: BookUpdate,
}

#[derive(Deserialize)]
struct UpdateSettingsParams {
    data_dir: String,
    update: SettingsUpdate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsResponse {
    settings: DisplaySettings,
    color_scheme: ColorScheme,
}

impl From<DisplaySettings> for SettingsResponse {
    fn from(settings: DisplaySettings) -> Self {
        Self {
            color_scheme: settings.color_scheme(),
            settings,
        }
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Install the log subscriber
///
/// Params: a `LoggingConfig`, e.g. `{"format":"json","level":"debug"}`
pub fn init_logging(params_json: &str) -> String {
    catch_panic(|| {
        result_to_json(parse_params::<LoggingConfig>(params_json).and_then(|config| {
            install_logging(&config)?;
            Ok(true)
        }))
    })
}

/// Open a library
///
/// Params: a `LibraryConfig`. Returns the `OpenReport`.
///
/// Opening a library that is already registered with the same configuration
/// reuses the live handle. A different configuration is rejected until the
/// library is closed.
pub fn open(params_json: &str) -> String {
    run(async {
        let config: LibraryConfig = parse_params(params_json)?;
        config.validate()?;
        let key = config.data_dir.to_string_lossy().into_owned();

        let existing = registry()?.get(&key).map(Arc::clone);
        if let Some(handle) = existing {
            handle.ensure_config(&config)?;
            debug!(data_dir = %key, "Library already open");
            return Ok(handle.current_report().await);
        }

        let opened = Arc::new(LibraryHandle::open(&config).await?);

        // Another caller may have registered the same directory meanwhile
        let handle = {
            let mut libraries = registry()?;
            let entry = libraries.entry(key.clone()).or_insert_with(|| Arc::clone(&opened));
            Arc::clone(entry)
        };
        if !Arc::ptr_eq(&handle, &opened) {
            handle.ensure_config(&config)?;
            return Ok(handle.current_report().await);
        }

        let report = handle.report.clone();
        info!(data_dir = %key, outcome = %report.outcome, "Library opened from host");
        Ok(report)
    })
}

/// Forget an opened library. Returns whether one was registered.
pub fn close(params_json: &str) -> String {
    run(async {
        let params: LibraryParams = parse_params(params_json)?;
        let removed = registry()?.remove(&params.data_dir).is_some();
        debug!(data_dir = %params.data_dir, removed, "Library closed");
        Ok(removed)
    })
}

/// All books in collection order
pub fn list_books(params_json: &str) -> String {
    run(async {
        let params: LibraryParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let library = handle.library.lock().await;
        Ok(library.books().to_vec())
    })
}

pub fn get_book(params_json: &str) -> String {
    run(async {
        let params: BookParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let library = handle.library.lock().await;
        Ok(library.require(params.id)?.clone())
    })
}

/// Top list; `count` defaults to the configured length
pub fn top_rated(params_json: &str) -> String {
    run(async {
        let params: TopRatedParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let library = handle.library.lock().await;

        let books = match params.count {
            Some(n) => library.top_rated_n(n),
            None => library.top_rated(),
        };
        Ok(books.into_iter().cloned().collect::<Vec<_>>())
    })
}

pub fn books_by_author(params_json: &str) -> String {
    run(async {
        let params: BookParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let library = handle.library.lock().await;
        let books = library.books_by_author(params.id)?;
        Ok(books.into_iter().cloned().collect::<Vec<_>>())
    })
}

pub fn book_details(params_json: &str) -> String {
    run(async {
        let params: BookParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let library = handle.library.lock().await;
        library.details(params.id)
    })
}

/// Params: `{"data_dir": "...", "book": {"title": ..., "author": ..., "imageUrl": ...}}`
pub fn add_book(params_json: &str) -> String {
    run(async {
        let params: AddBookParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let mut library = handle.library.lock().await;
        library.add_book(params.book).await
    })
}

/// Params: `{"data_dir": "...", "id": 3, "update": {"pagesRead": 120}}`
pub fn update_book(params_json: &str) -> String {
    run(async {
        let params: UpdateBookParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let mut library = handle.library.lock().await;
        library.update_book(params.id, params.update).await
    })
}

pub fn get_settings(params_json: &str) -> String {
    run(async {
        let params: LibraryParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        let settings = handle.settings.load().await?;
        Ok(SettingsResponse::from(settings))
    })
}

pub fn update_settings(params_json: &str) -> String {
    run(async {
        let params: UpdateSettingsParams = parse_params(params_json)?;
        let handle = handle_for(&params.data_dir).await?;
        // Serialize settings writes with collection writes
        let _guard = handle.library.lock().await;
        let settings = handle.settings.update(params.update).await?;
        Ok(SettingsResponse::from(settings))
    })
}

/// Route a command by name
pub fn dispatch(command: &str, params_json: &str) -> String {
    match command {
        "init_logging" => init_logging(params_json),
        "open" => open(params_json),
        "close" => close(params_json),
        "list_books" => list_books(params_json),
        "get_book" => get_book(params_json),
        "top_rated" => top_rated(params_json),
        "books_by_author" => books_by_author(params_json),
        "book_details" => book_details(params_json),
        "add_book" => add_book(params_json),
        "update_book" => update_book(params_json),
        "get_settings" => get_settings(params_json),
        "update_settings" => update_settings(params_json),
        other => {
            let err = BookwormError::invalid_input(format!("Unknown command: {}", other));
            error_to_json(&err)
        }
    }
}

/// Backend description of an opened library, for diagnostics
pub fn describe(data_dir: &str) -> Option<String> {
    let libraries = registry().ok()?;
    let handle = libraries.get(data_dir)?;
    let library = handle.library.try_lock().ok()?;
    Some(library.store().backend().describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn call(command: &str, params: Value) -> Value {
        serde_json::from_str(&dispatch(command, &params.to_string())).unwrap()
    }

    fn dir_of(temp_dir: &TempDir) -> String {
        temp_dir.path().to_string_lossy().into_owned()
    }

    #[test]
    fn test_open_seeds_and_lists() {
        let temp_dir = TempDir::new().unwrap();
        let dir = dir_of(&temp_dir);

        let opened = call("open", json!({ "data_dir": dir }));
        assert_eq!(opened["success"], true);
        assert_eq!(opened["data"]["outcome"], "seeded");
        assert_eq!(opened["data"]["bookCount"], 16);

        let listed = call("list_books", json!({ "data_dir": dir }));
        assert_eq!(listed["data"].as_array().unwrap().len(), 16);
        assert_eq!(listed["data"][0]["id"], 0);
        assert!(listed["data"][0]["imageUrl"].is_string());

        let top = call("top_rated", json!({ "data_dir": dir }));
        assert_eq!(top["data"].as_array().unwrap().len(), 3);

        assert!(describe(&dir).unwrap().starts_with("file:"));
    }

    #[test]
    fn test_add_and_update_book() {
        let temp_dir = TempDir::new().unwrap();
        let dir = dir_of(&temp_dir);

        let added = call(
            "add_book",
            json!({
                "data_dir": dir,
                "book": { "title": "Dune", "author": "Frank Herbert", "imageUrl": "dune.png", "totalPages": 412 }
            }),
        );
        assert_eq!(added["success"], true);
        assert_eq!(added["data"]["id"], 16);

        let updated = call(
            "update_book",
            json!({ "data_dir": dir, "id": 16, "update": { "pagesRead": 100 } }),
        );
        assert_eq!(updated["data"]["pagesRead"], 100);

        let details = call("book_details", json!({ "data_dir": dir, "id": 16 }));
        assert_eq!(details["data"]["progress"]["pagesRead"], 100);
        assert_eq!(details["data"]["progress"]["totalPages"], 412);
        assert_eq!(details["data"]["book"]["title"], "Dune");

        let rejected = call(
            "add_book",
            json!({ "data_dir": dir, "book": { "title": "", "author": "X", "imageUrl": "Y" } }),
        );
        assert_eq!(rejected["success"], false);
        assert_eq!(rejected["kind"], "validation");

        let listed = call("list_books", json!({ "data_dir": dir }));
        assert_eq!(listed["data"].as_array().unwrap().len(), 17);
    }

    #[test]
    fn test_errors() {
        let temp_dir = TempDir::new().unwrap();
        let dir = dir_of(&temp_dir);

        let missing = call("get_book", json!({ "data_dir": dir, "id": 99 }));
        assert_eq!(missing["success"], false);
        assert_eq!(missing["kind"], "not_found");
        assert_eq!(missing["error"], "Book not found: 99");
        assert_eq!(missing["message"], "Book not found");

        let incomplete = call(
            "add_book",
            json!({ "data_dir": dir, "book": { "title": "Dune", "author": "Frank Herbert", "imageUrl": " " } }),
        );
        assert_eq!(incomplete["message"], "Please fill in the image url field before saving.");

        let bad_json: Value = serde_json::from_str(&dispatch("list_books", "not json")).unwrap();
        assert_eq!(bad_json["kind"], "validation");

        let unknown = call("delete_book", json!({}));
        assert_eq!(unknown["success"], false);
        assert!(unknown["error"].as_str().unwrap().contains("delete_book"));
    }

    #[test]
    fn test_open_twice_keeps_live_library() {
        let temp_dir = TempDir::new().unwrap();
        let dir = dir_of(&temp_dir);

        assert_eq!(call("open", json!({ "data_dir": dir }))["success"], true);
        let added = call(
            "add_book",
            json!({ "data_dir": dir, "book": { "title": "Dune", "author": "Frank Herbert", "imageUrl": "dune.png" } }),
        );
        assert_eq!(added["success"], true);

        let again = call("open", json!({ "data_dir": dir }));
        assert_eq!(again["success"], true);
        assert_eq!(again["data"]["bookCount"], 17);

        let listed = call("list_books", json!({ "data_dir": dir }));
        assert_eq!(listed["data"].as_array().unwrap().len(), 17);

        let conflicting = call("open", json!({ "data_dir": dir, "top_rated_count": 5 }));
        assert_eq!(conflicting["success"], false);
        assert_eq!(conflicting["kind"], "configuration");

        // The live handle is untouched by the rejected open
        let top = call("top_rated", json!({ "data_dir": dir }));
        assert_eq!(top["data"].as_array().unwrap().len(), 3);

        assert_eq!(call("close", json!({ "data_dir": dir }))["data"], true);
        let reopened = call("open", json!({ "data_dir": dir, "top_rated_count": 5 }));
        assert_eq!(reopened["success"], true);
        assert_eq!(reopened["data"]["outcome"], "loaded");
        assert_eq!(reopened["data"]["bookCount"], 17);
    }

    #[test]
    fn test_settings_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let dir = dir_of(&temp_dir);

        let initial = call("get_settings", json!({ "data_dir": dir }));
        assert_eq!(initial["data"]["colorScheme"], "light");

        let updated = call(
            "update_settings",
            json!({ "data_dir": dir, "update": { "darkTheme": true } }),
        );
        assert_eq!(updated["data"]["settings"]["darkTheme"], true);
        assert_eq!(updated["data"]["colorScheme"], "dark");

        assert_eq!(call("close", json!({ "data_dir": dir }))["data"], true);
        let reopened = call("get_settings", json!({ "data_dir": dir }));
        assert_eq!(reopened["data"]["settings"]["darkTheme"], true);
    }

    #[test]
    fn test_catch_panic() {
        let response: Value = serde_json::from_str(&catch_panic(|| panic!("boom"))).unwrap();
        assert_eq!(response["success"], false);
        assert_eq!(response["kind"], "internal");
        assert!(response["error"].as_str().unwrap().contains("boom"));
        assert_eq!(response["message"], response["error"]);
    }
}
