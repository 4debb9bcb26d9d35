// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from [`BackendId`] to the backend that serves it.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crossway_core::{BackendAdapter, BackendId, CrosswayError, PluginAdapter};

/// Backends available to the turn executor, keyed by route.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<BackendId, Arc<dyn BackendAdapter>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct every backend in [`BackendId::ALL`] order.
    ///
    /// If any construction fails, the backends already built are shut down
    /// before the error is returned.
    pub async fn connect<F, Fut>(mut build: F) -> Result<Self, CrosswayError>
    where
        F: FnMut(BackendId) -> Fut,
        Fut: Future<Output = Result<Arc<dyn BackendAdapter>, CrosswayError>>,
    {
        let mut registry = Self::new();
        for id in BackendId::ALL {
            match build(id).await {
                Ok(backend) => {
                    debug!(backend = %id, name = backend.name(), "backend ready");
                    registry.insert(id, backend);
                }
                Err(e) => {
                    error!(backend = %id, error = %e, "backend construction failed");
                    registry.shutdown_all().await;
                    return Err(e);
                }
            }
        }
        info!(count = registry.len(), "all backends connected");
        Ok(registry)
    }

    /// Register `backend` for `id`, returning the one it replaces.
    pub fn insert(
        &mut self,
        id: BackendId,
        backend: Arc<dyn BackendAdapter>,
    ) -> Option<Arc<dyn BackendAdapter>> {
        self.backends.insert(id, backend)
    }

    /// Look up the backend for a route.
    pub fn get(&self, id: BackendId) -> Result<&Arc<dyn BackendAdapter>, CrosswayError> {
        self.backends
            .get(&id)
            .ok_or_else(|| CrosswayError::BackendUnavailable {
                backend: id,
                message: "no backend registered".to_string(),
            })
    }

    pub fn contains(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = BackendId> + '_ {
        self.backends.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Fails with a configuration error naming every route without a backend.
    pub fn ensure_complete(&self) -> Result<(), CrosswayError> {
        let missing: Vec<String> = BackendId::ALL
            .iter()
            .filter(|id| !self.contains(**id))
            .map(|id| id.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CrosswayError::Config(format!(
                "no backend registered for: {}",
                missing.join(", ")
            )))
        }
    }

    /// Shut down every backend, continuing past failures.
    ///
    /// Returns the failures, which are also logged.
    pub async fn shutdown_all(&self) -> Vec<(BackendId, CrosswayError)> {
        let results = join_all(
            self.backends
                .iter()
                .map(|(id, backend)| async move { (*id, backend.shutdown().await) }),
        )
        .await;

        let mut failures = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => debug!(backend = %id, "backend shut down"),
                Err(e) => {
                    warn!(backend = %id, error = %e, "backend shutdown failed");
                    failures.push((id, e));
                }
            }
        }
        failures
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
