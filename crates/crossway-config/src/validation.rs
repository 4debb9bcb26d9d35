// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use std::collections::HashMap;

use crate::diagnostic::ConfigError;
use crate::model::CrosswayConfig;

/// Validate a deserialized configuration.
///
/// Collects every violation instead of stopping at the first.
pub fn validate_config(config: &CrosswayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    let routing = &config.routing;
    if routing.word_threshold == 0 {
        invalid("routing.word_threshold must be at least 1".to_string());
    }

    // A keyword may only drive one rule.
    let mut owners: HashMap<String, &str> = HashMap::new();
    let lists = [
        ("multi_agent_keywords", &routing.multi_agent_keywords),
        ("retrieval_keywords", &routing.retrieval_keywords),
        ("hosted_keywords", &routing.hosted_keywords),
    ];
    for (list_name, keywords) in lists {
        for keyword in keywords {
            if keyword.is_empty() || !keyword.chars().all(char::is_alphanumeric) {
                invalid(format!(
                    "routing.{list_name} entry `{keyword}` must be a single word of letters or digits"
                ));
                continue;
            }
            let normalized = keyword.to_lowercase();
            match owners.get(&normalized) {
                Some(owner) if *owner != list_name => invalid(format!(
                    "routing keyword `{keyword}` appears in both {owner} and {list_name}"
                )),
                _ => {
                    owners.insert(normalized, list_name);
                }
            }
        }
    }

    let session = &config.session;
    if session.exit_tokens.is_empty() {
        invalid("session.exit_tokens must contain at least one token".to_string());
    }
    if session.exit_tokens.iter().any(|t| t.trim().is_empty()) {
        invalid("session.exit_tokens must not contain blank entries".to_string());
    }
    if session.backend_timeout_secs == 0 {
        invalid("session.backend_timeout_secs must be at least 1".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path must not be empty".to_string());
    }

    for (key, url) in [
        ("hosted.base_url", &config.hosted.base_url),
        ("local.base_url", &config.local.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            invalid(format!("{key} `{url}` must start with http:// or https://"));
        }
    }

    for (key, process) in [
        ("retrieval.command", &config.retrieval),
        ("multi_agent.command", &config.multi_agent),
    ] {
        if process.command.first().is_some_and(|p| p.trim().is_empty()) {
            invalid(format!("{key} program must not be blank"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
