// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock backend adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crossway_core::{BackendAdapter, BackendId, CrosswayError, HealthStatus, PluginAdapter};

/// A backend that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default `"<id> response"` text is returned. Every call is logged as
/// `(prompt, memory)`.
pub struct MockBackend {
    id: BackendId,
    name: String,
    responses: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    shutdowns: AtomicUsize,
}

impl MockBackend {
    pub fn new(id: BackendId) -> Self {
        Self {
            id,
            name: format!("mock-{id}"),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            delay: Mutex::new(None),
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Create a mock pre-loaded with the given responses.
    pub fn with_responses<I, S>(id: BackendId, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            ..Self::new(id)
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Make every subsequent call fail with `BackendUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sleep this long before answering.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    pub async fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockBackend {
    fn name(&self) -> &str {
        &self.name
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
impl BackendAdapter for MockBackend {
    async fn generate(&self, prompt: &str, memory: &str) -> Result<String, CrosswayError> {
        self.calls
            .lock()
            .await
            .push((prompt.to_string(), memory.to_string()));

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(CrosswayError::BackendUnavailable {
                backend: self.id,
                message: "mock failure".to_string(),
            });
        }

        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| format!("{} response", self.id)))
    }
}
