// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Ollama's chat endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crossway_config::model::LocalConfig;
use crossway_core::{BackendAdapter, BackendId, CrosswayError, HealthStatus, PluginAdapter};

use crate::types::{OllamaChatRequest, OllamaChatResponse, OllamaError, OllamaMessage};

const BACKEND: BackendId = BackendId::Local;

/// Local-model backend.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl OllamaBackend {
    pub fn new(config: &LocalConfig, timeout: Duration) -> Result<Self, CrosswayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrosswayError::BackendUnavailable {
                backend: BACKEND,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout,
        })
    }

    pub fn build_request(&self, prompt: &str, memory: &str) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !memory.trim().is_empty() {
            messages.push(OllamaMessage {
                role: "system".to_string(),
                content: format!("Conversation so far:\n{memory}"),
            });
        }
        messages.push(OllamaMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });
        OllamaChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
        }
    }

    fn unavailable(message: String) -> CrosswayError {
        CrosswayError::BackendUnavailable {
            backend: BACKEND,
            message,
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> CrosswayError {
        if err.is_timeout() {
            CrosswayError::BackendTimeout {
                backend: BACKEND,
                duration: self.timeout,
            }
        } else if err.is_connect() {
            Self::unavailable(format!("cannot reach Ollama at {}: {err}", self.base_url))
        } else {
            Self::unavailable(format!("HTTP request failed: {err}"))
        }
    }
}

#[async_trait]
impl PluginAdapter for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    /// Pings `GET /api/tags`.
    async fn health_check(&self) -> Result<HealthStatus, CrosswayError> {
        match self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Degraded(format!("status {}", resp.status()))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), CrosswayError> {
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for OllamaBackend {
    async fn generate(&self, prompt: &str, memory: &str) -> Result<String, CrosswayError> {
        let request = self.build_request(prompt, memory);
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        debug!(status = %status, model = %self.model, "ollama chat response");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(Self::unavailable(format!("Ollama returned {status}: {detail}")));
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| Self::unavailable(format!("malformed chat response: {e}")))?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn backend(base_url: &str) -> OllamaBackend {
        let config = LocalConfig {
            base_url: base_url.to_string(),
            model: "llama3".to_string(),
        };
        OllamaBackend::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "llama3", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3",
                "message": {"role": "assistant", "content": "Autumn waves recede."},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = backend(&server.uri())
            .generate("write a poem about the sea", "User: hi\nInternal: Hello!\n")
            .await
            .unwrap();
        assert_eq!(text, "Autumn waves recede.");
    }

    #[tokio::test]
    async fn missing_model_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "model 'llama3' not found"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server.uri()).generate("hello", "").await.unwrap_err();
        assert_eq!(err.backend(), Some(BackendId::Local));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn health_check_pings_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
            .mount(&server)
            .await;

        let status = backend(&server.uri()).health_check().await.unwrap();
        assert_eq!(status, HealthStatus::Healthy);
    }

    #[test]
    fn empty_memory_is_not_sent() {
        let request = backend("http://localhost:11434").build_request("hello there", "");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }
}
