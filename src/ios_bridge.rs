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

//! C FFI bridge for iOS
//!
//! C-compatible wrappers around the command handlers, called from Swift.
//! Parameters and results are JSON strings; see [`crate::bridge`] for the
//! response format.
//!
//! # Memory Management
//! Every string returned from this module MUST be released with
//! `bookworm_free_string()`, exactly once.
//!
//! ```swift
//! let resultPtr = bookworm_list_books(paramsJson)
//! defer { bookworm_free_string(resultPtr) }
//! let jsonString = String(cString: resultPtr!)
//! ```

use crate::bridge::{self, error_response, error_to_json};
use crate::error::{BookwormError, Result};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Safely convert C string pointer to Rust String
///
/// # Safety
/// Caller must ensure ptr is null or a valid null-terminated C string
fn c_str_to_string(ptr: *const c_char) -> Result<String> {
    if ptr.is_null() {
        return Err(BookwormError::invalid_input("Null pointer received"));
    }
    unsafe {
        CStr::from_ptr(ptr)
            .to_str()
            .map(|s| s.to_string())
            .map_err(|e| BookwormError::invalid_input(format!("Invalid UTF-8: {}", e)))
    }
}

/// Convert Rust string to C string pointer, freed by `bookworm_free_string()`
fn string_to_c_str(s: String) -> *mut c_char {
    let c_string = CString::new(s).or_else(|_| {
        CString::new(error_response("Response contains null bytes", "internal"))
    });
    match c_string {
        Ok(c_string) => c_string.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Read the parameter string and run `handler` on it
fn call_with_params(params_json: *const c_char, handler: fn(&str) -> String) -> *mut c_char {
    let response = match c_str_to_string(params_json) {
        Ok(params) => handler(&params),
        Err(e) => error_to_json(&e),
    };
    string_to_c_str(response)
}

// ============================================================================
// EXPORTS
// ============================================================================

#[no_mangle]
pub extern "C" fn bookworm_init_logging(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::init_logging)
}

/// Open a library. Params: `LibraryConfig` JSON.
#[no_mangle]
pub extern "C" fn bookworm_open(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::open)
}

#[no_mangle]
pub extern "C" fn bookworm_close(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::close)
}

#[no_mangle]
pub extern "C" fn bookworm_list_books(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::list_books)
}

#[no_mangle]
pub extern "C" fn bookworm_get_book(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::get_book)
}

#[no_mangle]
pub extern "C" fn bookworm_top_rated(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::top_rated)
}

#[no_mangle]
pub extern "C" fn bookworm_books_by_author(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::books_by_author)
}

#[no_mangle]
pub extern "C" fn bookworm_book_details(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::book_details)
}

#[no_mangle]
pub extern "C" fn bookworm_add_book(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::add_book)
}

#[no_mangle]
pub extern "C" fn bookworm_update_book(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::update_book)
}

#[no_mangle]
pub extern "C" fn bookworm_get_settings(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::get_settings)
}

#[no_mangle]
pub extern "C" fn bookworm_update_settings(params_json: *const c_char) -> *mut c_char {
    call_with_params(params_json, bridge::update_settings)
}

/// Route any command by name
#[no_mangle]
pub extern "C" fn bookworm_call(command: *const c_char, params_json: *const c_char) -> *mut c_char {
    let response = match (c_str_to_string(command), c_str_to_string(params_json)) {
        (Ok(command), Ok(params)) => bridge::dispatch(&command, &params),
        (Err(e), _) | (_, Err(e)) => error_to_json(&e),
    };
    string_to_c_str(response)
}

/// Free a string returned by any `bookworm_*` function
///
/// # Safety
/// Must be called exactly once per returned pointer. Null is ignored.
#[no_mangle]
pub extern "C" fn bookworm_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            // Take ownership and drop the CString
            let _ = CString::from_raw(ptr);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn take(ptr: *mut c_char) -> Value {
        assert!(!ptr.is_null());
        let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        bookworm_free_string(ptr);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_null_pointer_is_an_error() {
        let response = take(bookworm_list_books(std::ptr::null()));
        assert_eq!(response["success"], false);
        assert_eq!(response["kind"], "validation");
    }

    #[test]
    fn test_call_routes_commands() {
        let temp_dir = TempDir::new().unwrap();
        let params = CString::new(
            serde_json::json!({ "data_dir": temp_dir.path(), "id": 7 }).to_string(),
        )
        .unwrap();
        let command = CString::new("get_book").unwrap();

        let response = take(bookworm_call(command.as_ptr(), params.as_ptr()));
        assert_eq!(response["success"], true);
        assert_eq!(response["data"]["id"], 7);
    }

    #[test]
    fn test_free_null_is_noop() {
        bookworm_free_string(std::ptr::null_mut());
    }
}
