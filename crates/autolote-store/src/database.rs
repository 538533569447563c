// SPDX-FileCopyrightText: 2026 Autolote Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with schema setup and WAL mode.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use autolote_core::AutoloteError;
use tokio_rusqlite::Connection;

/// Wrapper around the async SQLite connection used by the lead store.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Open (or create) the database at `path` and apply the schema.
    pub async fn open(path: &str) -> Result<Self, AutoloteError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| AutoloteError::Store {
                source: Box::new(e),
            })?;
        }

        let connection = Connection::open(path).await.map_err(map_rq_err)?;

        connection
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA foreign_keys = ON;
                     CREATE TABLE IF NOT EXISTS leads (
                         phone       TEXT PRIMARY KEY,
                         body        TEXT NOT NULL,
                         updated_at  TEXT NOT NULL
                     );",
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        Ok(Self { connection })
    }

    /// Access the underlying async connection.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> AutoloteError {
    AutoloteError::Store {
        source: Box::new(err),
    }
}

/// Map a rusqlite error into the workspace error type.
pub fn map_rq_err(err: rusqlite::Error) -> AutoloteError {
    AutoloteError::Store {
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_database_and_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leads.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        assert!(path.exists());

        // Schema is usable.
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO leads (phone, body, updated_at) VALUES (?1, ?2, ?3)",
                    ("573001234567", "{}", "2026-01-01T00:00:00Z"),
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/dirs/leads.db");
        Database::open(path.to_str().unwrap()).await.unwrap();
        assert!(path.exists());
    }
}
