// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One prompt-in, response-out cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crossway_core::{BackendAdapter, BackendId, CrosswayError, MemoryAdapter};
use crossway_router::RouteClassifier;

use crate::registry::BackendRegistry;

/// Formats the transcript record for one exchange.
pub fn format_record(prompt: &str, route: BackendId, response: &str) -> String {
    format!("User: {prompt}\n{}: {response}\n", route.label())
}

/// State threaded through a single turn.
///
/// Created at the start of a turn and consumed by [`TurnState::complete`];
/// the input, route and starting transcript never change once set.
#[derive(Debug)]
pub struct TurnState {
    input: String,
    route: BackendId,
    memory: String,
    output: String,
}

impl TurnState {
    pub fn new(input: impl Into<String>, route: BackendId, memory: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            route,
            memory: memory.into(),
            output: String::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn route(&self) -> BackendId {
        self.route
    }

    /// The transcript as it stood when the turn started.
    pub fn memory(&self) -> &str {
        &self.memory
    }

    /// Empty until the backend has answered.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Record the backend's answer and return `(response, updated transcript)`.
    pub fn complete(mut self, output: String) -> (String, String) {
        self.output = output;
        let record = format_record(&self.input, self.route, &self.output);
        self.memory.push_str(&record);
        (self.output, self.memory)
    }
}

/// Result of a turn whose backend call succeeded.
#[derive(Debug)]
pub struct TurnOutcome {
    pub route: BackendId,
    pub response: String,
    /// The transcript including this turn's record.
    pub memory: String,
    /// Set when the transcript could not be persisted; the response is still valid.
    pub save_error: Option<CrosswayError>,
}

/// Classifies prompts, dispatches them, and persists the grown transcript.
pub struct TurnExecutor {
    classifier: RouteClassifier,
    backends: Arc<BackendRegistry>,
    store: Arc<dyn MemoryAdapter>,
    timeout: Duration,
}

impl TurnExecutor {
    pub fn new(
        classifier: RouteClassifier,
        backends: Arc<BackendRegistry>,
        store: Arc<dyn MemoryAdapter>,
        timeout: Duration,
    ) -> Self {
        Self {
            classifier,
            backends,
            store,
            timeout,
        }
    }

    pub fn classifier(&self) -> &RouteClassifier {
        &self.classifier
    }

    pub fn backends(&self) -> &Arc<BackendRegistry> {
        &self.backends
    }

    pub fn store(&self) -> &Arc<dyn MemoryAdapter> {
        &self.store
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one turn against `memory`.
    ///
    /// A backend failure or timeout returns `Err` and leaves the store
    /// untouched. On success the updated transcript is saved exactly once
    /// before returning; a failed save is reported in
    /// [`TurnOutcome::save_error`] rather than discarding the response.
    pub async fn execute(&self, prompt: &str, memory: &str) -> Result<TurnOutcome, CrosswayError> {
        let decision = self.classifier.decide(prompt);
        let route = decision.backend;
        debug!(backend = %route, rule = decision.rule_index, reason = %decision.reason, "prompt classified");

        let state = TurnState::new(prompt, route, memory);
        let backend = self.backends.get(route)?;

        let started = Instant::now();
        let output = match tokio::time::timeout(
            self.timeout,
            backend.generate(state.input(), state.memory()),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(backend = %route, error = %e, "backend call failed");
                return Err(attribute(route, e));
            }
            Err(_) => {
                warn!(backend = %route, timeout_secs = self.timeout.as_secs(), "backend call timed out");
                return Err(CrosswayError::BackendTimeout {
                    backend: route,
                    duration: self.timeout,
                });
            }
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (response, memory) = state.complete(output);
        let save_error = self.store.save(&memory).await.err();
        match &save_error {
            None => info!(
                backend = %route,
                elapsed_ms,
                bytes = memory.len(),
                "turn completed"
            ),
            Some(e) => warn!(
                backend = %route,
                elapsed_ms,
                error = %e,
                "turn completed but transcript was not saved"
            ),
        }

        Ok(TurnOutcome {
            route,
            response,
            memory,
            save_error,
        })
    }
}

/// Make sure a failure surfaced from `route` names `route`.
fn attribute(route: BackendId, err: CrosswayError) -> CrosswayError {
    match err.backend() {
        Some(backend) if backend == route => err,
        _ => CrosswayError::BackendUnavailable {
            backend: route,
            message: err.to_string(),
        },
    }
}
