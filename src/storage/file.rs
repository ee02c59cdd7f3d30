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

//! File-backed blob store
//!
//! Each key maps to one file directly under the data directory, e.g.
//! `<data_dir>/books.json`.
//!
//! # Key Operations
//! - Missing file reads as "no blob" rather than an error
//! - Writes go to a hidden temp sibling, are synced, then renamed over the
//!   target so a crash never leaves a half-written collection behind
//! - Failed renames are retried a few times

use crate::error::{BookwormError, Result};
use crate::storage::{validate_key, BlobStore};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::time::sleep;
use tracing::debug;

/// Maximum retry attempts for the final rename
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Delay between retry attempts
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Blob store writing one file per key
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    /// Directory holding the blobs
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the file backing `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Ensure directory exists, creating parent directories as needed
    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if Self::file_exists(path).await {
            return Ok(());
        }

        fs::create_dir_all(path).await.map_err(|e| {
            BookwormError::FileIoError(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Check if file exists
    async fn file_exists(path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Atomic write: write to temp file, sync, then rename
    async fn atomic_write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("blob");
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

        fs::write(&temp_path, contents).await.map_err(|e| {
            BookwormError::FileIoError(format!(
                "Failed to write temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        let file = fs::OpenOptions::new()
            .write(true)
            .open(&temp_path)
            .await
            .map_err(|e| {
                BookwormError::FileIoError(format!(
                    "Failed to open temp file for sync {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

        file.sync_all().await.map_err(|e| {
            BookwormError::FileIoError(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        drop(file);

        let mut attempts = 0;
        loop {
            attempts += 1;

            match fs::rename(&temp_path, path).await {
                Ok(()) => return Ok(()),
                Err(e) if attempts >= MAX_RETRY_ATTEMPTS => {
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(BookwormError::FileIoError(format!(
                        "Failed to rename temp file {} to {} after {} attempts: {}",
                        temp_path.display(),
                        path.display(),
                        MAX_RETRY_ATTEMPTS,
                        e
                    )));
                }
                Err(_) => {
                    sleep(RETRY_DELAY).await;
                }
            }
        }
    }
}

impl BlobStore for FileBlobStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;

        match fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Read blob");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BookwormError::FileIoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn write(&self, key: &str, contents: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        self.ensure_directory_exists(&self.root).await?;
        self.atomic_write(&path, contents).await?;

        debug!(path = %path.display(), bytes = contents.len(), "Wrote blob");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.root.display())
    }
}
