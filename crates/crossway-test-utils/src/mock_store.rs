// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory transcript store with failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crossway_core::{CrosswayError, HealthStatus, MemoryAdapter, PluginAdapter};

/// Keeps the transcript in a string and counts writes.
#[derive(Default)]
pub struct InMemoryStore {
    content: Mutex<String>,
    saves: AtomicUsize,
    fail_next_saves: AtomicUsize,
    fail_loads: AtomicBool,
    shutdowns: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing transcript, as if loaded after a restart.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(content.into()),
            ..Self::default()
        }
    }

    /// Make the next `n` saves fail without changing the stored text.
    pub fn fail_next_saves(&self, n: usize) {
        self.fail_next_saves.store(n, Ordering::SeqCst);
    }

    /// Make every load fail, as with an unreadable database.
    pub fn fail_loads(&self) {
        self.fail_loads.store(true, Ordering::SeqCst);
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn content(&self) -> String {
        self.content.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CrosswayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CrosswayError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl MemoryAdapter for InMemoryStore {
    async fn load(&self) -> Result<String, CrosswayError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(CrosswayError::persistence("injected load failure"));
        }
        Ok(self.content.lock().await.clone())
    }

    async fn save(&self, transcript: &str) -> Result<(), CrosswayError> {
        let pending = self.fail_next_saves.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_next_saves.store(pending - 1, Ordering::SeqCst);
            return Err(CrosswayError::persistence("injected save failure"));
        }
        *self.content.lock().await = transcript.to_string();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
