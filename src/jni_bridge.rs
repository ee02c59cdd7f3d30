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

//! JNI bridge for Android
//!
//! Exposes the command handlers to `com.zybooks.bookworm.BookwormNative`:
//!
//! ```kotlin
//! object BookwormNative {
//!     init { System.loadLibrary("bookworm_core") }
//!     external fun nativeOpen(paramsJson: String): String
//!     external fun nativeListBooks(paramsJson: String): String
//!     // ...
//!     external fun nativeDispatch(command: String, paramsJson: String): String
//! }
//! ```
//!
//! Every function takes and returns JSON. See [`crate::bridge`] for the
//! response format.

use crate::bridge::{self, error_to_json};
use crate::error::{BookwormError, Result};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Convert JString to Rust String
fn jstring_to_string(env: &mut JNIEnv, jstr: &JString) -> Result<String> {
    env.get_string(jstr)
        .map(|s| s.into())
        .map_err(|e| BookwormError::JniError(format!("JNI string conversion failed: {}", e)))
}

/// Hand a response back to Java, null if the JVM cannot allocate it
fn to_jstring(env: &mut JNIEnv, response: String) -> jstring {
    env.new_string(response)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// Read the parameter string and run `handler` on it
fn call_with_params(env: &mut JNIEnv, params_json: JString, handler: fn(&str) -> String) -> jstring {
    let response = match jstring_to_string(env, &params_json) {
        Ok(params) => handler(&params),
        Err(e) => error_to_json(&e),
    };
    to_jstring(env, response)
}

// ============================================================================
// EXPORTS
// ============================================================================

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeInitLogging(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::init_logging)
}

/// Open a library. Params: `LibraryConfig` JSON with the app's files dir as `data_dir`.
#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeOpen(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::open)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeClose(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::close)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeListBooks(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::list_books)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeGetBook(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::get_book)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeTopRated(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::top_rated)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeBooksByAuthor(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::books_by_author)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeBookDetails(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::book_details)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeAddBook(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::add_book)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeUpdateBook(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::update_book)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeGetSettings(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::get_settings)
}

#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeUpdateSettings(
    mut env: JNIEnv,
    _class: JClass,
    params_json: JString,
) -> jstring {
    call_with_params(&mut env, params_json, bridge::update_settings)
}

/// Route any command by name
#[no_mangle]
pub extern "C" fn Java_com_zybooks_bookworm_BookwormNative_nativeDispatch(
    mut env: JNIEnv,
    _class: JClass,
    command: JString,
    params_json: JString,
) -> jstring {
    let response = match (
        jstring_to_string(&mut env, &command),
        jstring_to_string(&mut env, &params_json),
    ) {
        (Ok(command), Ok(params)) => bridge::dispatch(&command, &params),
        (Err(e), _) | (_, Err(e)) => error_to_json(&e),
    };
    to_jstring(&mut env, response)
}
