// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MemoryAdapter trait.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use tokio::sync::OnceCell;
use tracing::debug;

use crossway_config::model::StorageConfig;
use crossway_core::{CrosswayError, HealthStatus, MemoryAdapter, PluginAdapter};

use crate::database::Database;

/// SQLite-backed transcript store.
///
/// The database is opened on the first call to [`SqliteMemoryStore::initialize`].
pub struct SqliteMemoryStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteMemoryStore {
    /// Create a store for the given configuration without opening it.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, CrosswayError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Open the database and run migrations. Idempotent.
    pub async fn initialize(&self) -> Result<(), CrosswayError> {
        self.db
            .get_or_try_init(|| Database::open(&self.config))
            .await?;
        Ok(())
    }

    fn db(&self) -> Result<&Database, CrosswayError> {
        self.db.get().ok_or_else(|| CrosswayError::Persistence {
            message: "memory store not initialized -- call initialize() first".to_string(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteMemoryStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CrosswayError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await
            .map_err(CrosswayError::persistence)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CrosswayError> {
        if let Some(db) = self.db.get() {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))?;
                    Ok(())
                })
                .await
                .map_err(CrosswayError::persistence)?;
            debug!(path = %db.path(), "wal checkpointed");
        }
        Ok(())
    }
}

#[async_trait]
impl MemoryAdapter for SqliteMemoryStore {
    async fn load(&self) -> Result<String, CrosswayError> {
        let transcript = self
            .db()?
            .connection()
            .call(|conn| -> Result<Option<String>, rusqlite::Error> {
                conn.query_row("SELECT content FROM transcript WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()
            })
            .await
            .map_err(CrosswayError::persistence)?
            .unwrap_or_default();
        debug!(bytes = transcript.len(), "transcript loaded");
        Ok(transcript)
    }

    async fn save(&self, transcript: &str) -> Result<(), CrosswayError> {
        let content = transcript.to_string();
        let bytes = content.len();
        let now = chrono::Utc::now().to_rfc3339();
        self.db()?
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "INSERT INTO transcript (id, content, updated_at) VALUES (1, ?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET content = excluded.content,
                                                   updated_at = excluded.updated_at",
                    params![content, now],
                )?;
                Ok(())
            })
            .await
            .map_err(CrosswayError::persistence)?;
        debug!(bytes, "transcript saved");
        Ok(())
    }
}
