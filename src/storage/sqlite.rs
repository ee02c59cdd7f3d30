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

//! SQLite-backed blob store
//!
//! Stores each blob as one row of the `blobs` table in `bookworm.db`. Useful
//! on hosts where the app already ships a database file and wants the
//! library inside it.
//!
//! # SQLite Configuration
//! - WAL mode
//! - Normal synchronous mode
//! - 30 second busy timeout

use crate::error::{BookwormError, Result};
use crate::storage::{migrations, validate_key, BlobStore};
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous},
    ConnectOptions,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Blob store over a SQLite key/value table
#[derive(Debug, Clone)]
pub struct SqliteBlobStore {
    pool: SqlitePool,
    path: Option<PathBuf>, // None for in-memory databases
}

impl SqliteBlobStore {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let path = database_path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    BookwormError::FileIoError(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let connect_opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30))
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(connect_opts)
            .await?;

        let store = Self {
            pool,
            path: Some(path.to_path_buf()),
        };
        store.migrate().await?;

        debug!(path = %path.display(), "Opened SQLite blob store");
        Ok(store)
    }

    /// Create in-memory database for testing
    pub async fn new_in_memory() -> Result<Self> {
        let connect_opts = SqliteConnectOptions::from_str("sqlite::memory:")?
            .disable_statement_logging();

        // A single connection that never expires, or the data goes with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect_opts)
            .await?;

        let store = Self { pool, path: None };
        store.migrate().await?;

        Ok(store)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        migrations::run_migrations(&self.pool)
            .await
            .map_err(|e| BookwormError::MigrationFailed(e.to_string()))
    }

    /// Get reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get database file path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close database and release all connections
    pub async fn close(self) {
        self.pool.close().await;
    }
}

impl BlobStore for SqliteBlobStore {
    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;

        let value: Option<Vec<u8>> = sqlx::query_scalar("SELECT value FROM blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    async fn write(&self, key: &str, contents: &[u8]) -> Result<()> {
        validate_key(key)?;

        sqlx::query(
            r#"
            INSERT INTO blobs (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(contents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(key, bytes = contents.len(), "Wrote blob row");
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let store = SqliteBlobStore::new_in_memory().await.expect("Failed to create store");

        assert!(store.read("books.json").await.unwrap().is_none());

        store.write("books.json", b"[1]").await.unwrap();
        store.write("books.json", b"[2]").await.unwrap();

        assert_eq!(store.read("books.json").await.unwrap().unwrap(), b"[2]");

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blobs")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("data").join("bookworm.db");

        let store = SqliteBlobStore::new(&db_path).await.unwrap();
        store.write("settings.json", b"{}").await.unwrap();
        store.close().await;

        let reopened = SqliteBlobStore::new(&db_path).await.unwrap();
        assert_eq!(reopened.read("settings.json").await.unwrap().unwrap(), b"{}");
        assert_eq!(reopened.path(), Some(db_path.as_path()));
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let store = SqliteBlobStore::new_in_memory().await.unwrap();
        store.migrate().await.unwrap();

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(applied, 1);
    }
}
