// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use supio_core::SupioError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Convert tokio-rusqlite errors into [`SupioError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error) -> SupioError {
    SupioError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the single shared SQLite connection.
///
/// Cloning is cheap; all clones route through the same writer thread.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path`, applies PRAGMAs, and runs
    /// all pending migrations.
    pub async fn open(path: &str) -> Result<Self, SupioError> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SupioError::Storage {
                        source: Box::new(e),
                    })?;
            }
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| {
            migrations::run_migrations(conn)?;
            Ok(())
        })
        .await
        .map_err(|e: tokio_rusqlite::Error<SupioError>| SupioError::Storage {
            source: Box::new(e),
        })?;

        debug!(path, "database opened");
        Ok(Self { conn })
    }

    /// The underlying connection handle for query modules.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, flushing pending writes.
    pub async fn close(self) -> Result<(), SupioError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_runs_migrations() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // All core tables must exist after open.
        let tables: Vec<String> = db
            .connection()
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type IN ('table', 'view')",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok::<Vec<String>, rusqlite::Error>(names)
            })
            .await
            .unwrap();

        for expected in [
            "contact_sessions",
            "conversations",
            "messages",
            "plugins",
            "subscriptions",
            "widget_settings",
            "tasks",
            "knowledge_namespaces",
            "knowledge_entries",
            "knowledge_fts",
        ] {
            assert!(
                tables.iter().any(|t| t == expected),
                "missing table {expected}, got {tables:?}"
            );
        }

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");

        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();

        // Second open re-runs the migration runner against applied history.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
