// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Crossway prompt router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Crossway configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CrosswayConfig {
    /// Identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Classification rules.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Session loop behavior.
    #[serde(default)]
    pub session: SessionConfig,

    /// Transcript persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Hosted-model backend (OpenAI-compatible API).
    #[serde(default)]
    pub hosted: HostedConfig,

    /// Local-model backend (Ollama).
    #[serde(default)]
    pub local: LocalConfig,

    /// Retrieval-augmented pipeline process.
    #[serde(default)]
    pub retrieval: ProcessBackendConfig,

    /// Multi-agent pipeline process.
    #[serde(default)]
    pub multi_agent: ProcessBackendConfig,
}

/// Identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name shown in the shell prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "crossway".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Keyword sets and thresholds for the ordered classification rules.
///
/// Rules are evaluated as: multi-agent keywords, retrieval keywords,
/// word-count threshold, hosted keywords, then the local fallback.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Prompts with fewer whitespace-separated words than this go to the internal backend.
    #[serde(default = "default_word_threshold")]
    pub word_threshold: usize,

    /// Whole-word keywords that select the multi-agent backend.
    #[serde(default = "default_multi_agent_keywords")]
    pub multi_agent_keywords: Vec<String>,

    /// Whole-word keywords that select the retrieval backend.
    #[serde(default = "default_retrieval_keywords")]
    pub retrieval_keywords: Vec<String>,

    /// Whole-word keywords that select the hosted-model backend.
    #[serde(default = "default_hosted_keywords")]
    pub hosted_keywords: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            word_threshold: default_word_threshold(),
            multi_agent_keywords: default_multi_agent_keywords(),
            retrieval_keywords: default_retrieval_keywords(),
            hosted_keywords: default_hosted_keywords(),
        }
    }
}

fn default_word_threshold() -> usize {
    5
}

fn default_multi_agent_keywords() -> Vec<String> {
    vec!["analyze".to_string(), "research".to_string()]
}

fn default_retrieval_keywords() -> Vec<String> {
    ["document", "retrieve", "design", "paper"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_hosted_keywords() -> Vec<String> {
    vec!["explain".to_string()]
}

/// Session loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Case-insensitive tokens that end the session.
    #[serde(default = "default_exit_tokens")]
    pub exit_tokens: Vec<String>,

    /// Upper bound on a single backend call, in seconds.
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Optional readline history file for the interactive shell.
    #[serde(default)]
    pub history_file: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            exit_tokens: default_exit_tokens(),
            backend_timeout_secs: default_backend_timeout_secs(),
            history_file: None,
        }
    }
}

fn default_exit_tokens() -> Vec<String> {
    vec!["exit".to_string(), "quit".to_string()]
}

fn default_backend_timeout_secs() -> u64 {
    120
}

/// Transcript storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "crossway.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Hosted-model backend configuration (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HostedConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_hosted_base_url")]
    pub base_url: String,

    /// Model identifier.
    #[serde(default = "default_hosted_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_hosted_max_tokens")]
    pub max_tokens: u32,

    /// Optional system prompt sent ahead of the transcript.
    #[serde(default)]
    pub system_prompt: Option<String>,
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_hosted_base_url(),
            model: default_hosted_model(),
            max_tokens: default_hosted_max_tokens(),
            system_prompt: None,
        }
    }
}

fn default_hosted_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_hosted_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_hosted_max_tokens() -> u32 {
    1024
}

/// Local-model backend configuration (Ollama).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LocalConfig {
    /// Ollama server URL.
    #[serde(default = "default_local_base_url")]
    pub base_url: String,

    /// Model name as known to Ollama.
    #[serde(default = "default_local_model")]
    pub model: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            model: default_local_model(),
        }
    }
}

fn default_local_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_local_model() -> String {
    "llama3".to_string()
}

/// A backend served by a long-lived child process over stdio.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessBackendConfig {
    /// Program and arguments. Empty means the backend is not configured.
    #[serde(default)]
    pub command: Vec<String>,

    /// Extra environment variables for the child process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ProcessBackendConfig {
    /// Returns `true` when a command has been configured.
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}
