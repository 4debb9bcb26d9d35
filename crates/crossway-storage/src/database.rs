// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup and migrations.
//!
//! All statements are serialized through tokio-rusqlite's single background
//! thread. Do not open additional connections for writes.

use crossway_config::model::StorageConfig;
use crossway_core::CrosswayError;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the open SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
    path: String,
}

impl Database {
    /// Open (creating if needed) the database, apply PRAGMAs, and run migrations.
    pub async fn open(config: &StorageConfig) -> Result<Self, CrosswayError> {
        let path = config.database_path.clone();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(CrosswayError::persistence)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(&path)
            .await
            .map_err(CrosswayError::persistence)?;

        let wal_mode = config.wal_mode;
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                // journal_mode returns the resulting mode as a row.
                conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))?;
            }
            conn.execute_batch(
                "PRAGMA synchronous=NORMAL;
                 PRAGMA busy_timeout=5000;",
            )?;
            Ok(())
        })
        .await
        .map_err(CrosswayError::persistence)?;
        debug!(path = %path, wal_mode, "database pragmas applied");

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(CrosswayError::persistence)?;
        info!(path = %path, "transcript database ready");

        Ok(Self { conn, path })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Filesystem path of the database.
    pub fn path(&self) -> &str {
        &self.path
    }
}
