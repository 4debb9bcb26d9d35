// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama `/api/chat` request and response types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    /// Always `false`: the router consumes complete responses.
    pub stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaChatResponse {
    pub message: OllamaMessage,
    #[serde(default)]
    pub done: bool,
}

/// Body of a non-2xx response, e.g. `{"error": "model 'x' not found"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OllamaError {
    pub error: String,
}
