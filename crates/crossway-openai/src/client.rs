// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crossway_config::model::HostedConfig;
use crossway_core::{BackendAdapter, BackendId, CrosswayError, HealthStatus, PluginAdapter};

use crate::types::{ApiErrorResponse, ChatMessage, ChatRequest, ChatResponse};

/// Environment variable consulted when `hosted.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const BACKEND: BackendId = BackendId::Hosted;

/// Hosted-model backend.
///
/// Retries once on transient statuses (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    system_prompt: Option<String>,
    timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenAiBackend {
    /// Build the backend. Fails when no API key is configured or in the environment.
    pub fn new(config: &HostedConfig, timeout: Duration) -> Result<Self, CrosswayError> {
        Self::with_env(config, timeout, |name| std::env::var(name).ok())
    }

    /// Like [`OpenAiBackend::new`], reading environment variables through `env`.
    pub fn with_env(
        config: &HostedConfig,
        timeout: Duration,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CrosswayError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(API_KEY_ENV))
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                CrosswayError::Config(format!(
                    "hosted backend requires an API key: set hosted.api_key or {API_KEY_ENV}"
                ))
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| CrosswayError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CrosswayError::BackendUnavailable {
                backend: BACKEND,
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            system_prompt: config.system_prompt.clone(),
            timeout,
            max_retries: 1,
            retry_delay: Duration::from_millis(500),
        })
    }

    /// Overrides the delay between retries.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Assemble the message list: system prompt, prior transcript, then the prompt.
    pub fn build_request(&self, prompt: &str, memory: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(3);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        if !memory.trim().is_empty() {
            messages.push(ChatMessage::system(format!(
                "Conversation so far:\n{memory}"
            )));
        }
        messages.push(ChatMessage::user(prompt));
        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> CrosswayError {
        if err.is_timeout() {
            CrosswayError::BackendTimeout {
                backend: BACKEND,
                duration: self.timeout,
            }
        } else {
            CrosswayError::BackendUnavailable {
                backend: BACKEND,
                message: format!("HTTP request failed: {err}"),
            }
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[async_trait]
impl PluginAdapter for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, CrosswayError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), CrosswayError> {
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for OpenAiBackend {
    async fn generate(&self, prompt: &str, memory: &str) -> Result<String, CrosswayError> {
        let request = self.build_request(prompt, memory);

        let mut attempt = 0;
        let response = loop {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;

            let status = response.status();
            debug!(status = %status, attempt, model = %self.model, "chat completion response");
            if is_transient(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error from hosted backend, retrying");
                attempt += 1;
                tokio::time::sleep(self.retry_delay).await;
                continue;
            }
            break response;
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(CrosswayError::BackendUnavailable {
                backend: BACKEND,
                message: format!("API returned {status}: {detail}"),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| CrosswayError::BackendUnavailable {
                    backend: BACKEND,
                    message: format!("malformed completion response: {e}"),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CrosswayError::BackendUnavailable {
                backend: BACKEND,
                message: "completion response contained no text".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: &str) -> HostedConfig {
        HostedConfig {
            api_key: Some("sk-test".to_string()),
            base_url: base_url.to_string(),
            model: "gpt-test".to_string(),
            max_tokens: 64,
            system_prompt: None,
        }
    }

    fn backend(server: &MockServer) -> OpenAiBackend {
        OpenAiBackend::new(&config(&server.uri()), Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(1))
    }

    fn completion(text: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}]
        })
    }

    #[test]
    fn request_includes_transcript_as_context() {
        let mut cfg = config("http://localhost");
        cfg.system_prompt = Some("Be brief.".into());
        let backend = OpenAiBackend::new(&cfg, Duration::from_secs(1)).unwrap();

        let request = backend.build_request("explain tides", "User: hi\nInternal: Hello!\n");
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0], ChatMessage::system("Be brief."));
        assert!(request.messages[1].content.contains("User: hi"));
        assert_eq!(request.messages[2], ChatMessage::user("explain tides"));

        let bare = backend.build_request("explain tides", "");
        assert_eq!(bare.messages.len(), 2);
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-test", "max_tokens": 64})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Tides follow the moon.")))
            .expect(1)
            .mount(&server)
            .await;

        let text = backend(&server).generate("explain tides please", "").await.unwrap();
        assert_eq!(text, "Tides follow the moon.");
    }

    #[tokio::test]
    async fn api_error_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"error": {"message": "bad key", "type": "auth"}})),
            )
            .mount(&server)
            .await;

        let err = backend(&server).generate("hello", "").await.unwrap_err();
        assert_eq!(err.backend(), Some(BackendId::Hosted));
        assert!(err.to_string().contains("bad key"), "got {err}");
    }

    #[tokio::test]
    async fn transient_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("second try")))
            .mount(&server)
            .await;

        let text = backend(&server).generate("hello", "").await.unwrap();
        assert_eq!(text, "second try");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = backend(&server).generate("hello", "").await.unwrap_err();
        assert!(matches!(err, CrosswayError::BackendUnavailable { .. }));
    }

    #[tokio::test]
    async fn slow_server_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(&config(&server.uri()), Duration::from_millis(50)).unwrap();
        let err = backend.generate("hello", "").await.unwrap_err();
        assert!(matches!(err, CrosswayError::BackendTimeout { backend: BackendId::Hosted, .. }));
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let mut cfg = config("http://localhost");
        cfg.api_key = Some("   ".to_string());
        // A blank key falls through to the environment.
        let err = OpenAiBackend::with_env(&cfg, Duration::from_secs(1), |_| None).unwrap_err();
        assert!(matches!(err, CrosswayError::Config(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[tokio::test]
    async fn api_key_falls_back_to_environment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-from-env"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("from env")))
            .expect(1)
            .mount(&server)
            .await;

        let mut cfg = config(&server.uri());
        cfg.api_key = None;
        let backend = OpenAiBackend::with_env(&cfg, Duration::from_secs(5), |name| {
            (name == API_KEY_ENV).then(|| "sk-from-env".to_string())
        })
        .unwrap();
        assert_eq!(backend.generate("hello", "").await.unwrap(), "from env");
    }
}
