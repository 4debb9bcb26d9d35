// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup wiring: the transcript store and one backend per route.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crossway_agent::{BackendRegistry, InternalBackend, TurnExecutor};
use crossway_config::model::CrosswayConfig;
use crossway_core::{BackendAdapter, BackendId, CrosswayError};
use crossway_ollama::OllamaBackend;
use crossway_openai::OpenAiBackend;
use crossway_router::RouteClassifier;
use crossway_stdio::StdioBackend;
use crossway_storage::SqliteMemoryStore;

/// Construct the backend serving `id`.
pub fn build_backend(
    id: BackendId,
    config: &CrosswayConfig,
    timeout: Duration,
) -> Result<Arc<dyn BackendAdapter>, CrosswayError> {
    let backend: Arc<dyn BackendAdapter> = match id {
        BackendId::Internal => Arc::new(InternalBackend::new()),
        BackendId::Hosted => Arc::new(OpenAiBackend::new(&config.hosted, timeout)?),
        BackendId::Local => Arc::new(OllamaBackend::new(&config.local, timeout)?),
        BackendId::Retrieval => Arc::new(StdioBackend::spawn(id, &config.retrieval)?),
        BackendId::MultiAgent => Arc::new(StdioBackend::spawn(id, &config.multi_agent)?),
    };
    Ok(backend)
}

/// Open the store and connect every backend.
///
/// Any failure here is fatal; backends already started are released first.
pub async fn connect(config: &CrosswayConfig) -> Result<TurnExecutor, CrosswayError> {
    let timeout = Duration::from_secs(config.session.backend_timeout_secs);

    let store = SqliteMemoryStore::open(config.storage.clone()).await?;
    info!(path = %config.storage.database_path, "transcript store opened");

    let registry =
        BackendRegistry::connect(|id| std::future::ready(build_backend(id, config, timeout))).await?;

    Ok(TurnExecutor::new(
        RouteClassifier::new(&config.routing),
        Arc::new(registry),
        Arc::new(store),
        timeout,
    ))
}

#[cfg(test)]
mod tests {
    use crossway_core::PluginAdapter;

    use super::*;

    #[test]
    fn internal_backend_needs_no_configuration() {
        let config = CrosswayConfig::default();
        let backend = build_backend(BackendId::Internal, &config, Duration::from_secs(1)).unwrap();
        assert_eq!(backend.name(), "internal");
    }

    #[test]
    fn unconfigured_pipeline_is_a_startup_error() {
        let config = CrosswayConfig::default();
        let err = build_backend(BackendId::Retrieval, &config, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, CrosswayError::Config(_)));
    }

    #[tokio::test]
    async fn connect_fails_without_pipelines() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CrosswayConfig::default();
        config.storage.database_path = dir.path().join("t.db").to_string_lossy().to_string();
        config.hosted.api_key = Some("sk-test".into());

        let err = connect(&config).await.err().unwrap();
        assert!(err.to_string().contains("retrieval"));
    }
}
