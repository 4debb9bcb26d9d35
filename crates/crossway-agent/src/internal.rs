// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process responder for short prompts.

use async_trait::async_trait;

use crossway_core::{BackendAdapter, CrosswayError, HealthStatus, PluginAdapter};

const GREETINGS: &[&str] = &["hi", "hello", "hey", "howdy", "greetings", "morning", "evening"];
const THANKS: &[&str] = &["thanks", "thank", "thx", "cheers"];
const FAREWELLS: &[&str] = &["bye", "goodbye", "farewell", "later"];
const RECAP: &[&str] = &["recap", "history", "summary"];

const HELP_TEXT: &str = "Short prompts are answered right here. Ask me to explain something \
for a hosted model, mention a document, design or paper to search the library, or ask me to \
analyze or research a topic for a multi-step investigation. Anything else goes to the local model.";

/// Deterministic responder used for prompts below the word threshold.
///
/// Performs no I/O and never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct InternalBackend;

impl InternalBackend {
    pub fn new() -> Self {
        Self
    }

    /// Produce the reply for `prompt` given the transcript so far.
    pub fn respond(prompt: &str, memory: &str) -> String {
        let words: Vec<String> = prompt
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        let has = |set: &[&str]| words.iter().any(|w| set.contains(&w.as_str()));

        if words.is_empty() {
            return "I'm listening. Ask me anything.".to_string();
        }
        if words.iter().any(|w| w == "help") {
            return HELP_TEXT.to_string();
        }
        if has(RECAP) {
            return match count_turns(memory) {
                0 => "Nothing to recap yet; this is the start of our conversation.".to_string(),
                1 => "We've exchanged 1 turn so far.".to_string(),
                n => format!("We've exchanged {n} turns so far."),
            };
        }
        if has(THANKS) {
            return "You're welcome!".to_string();
        }
        if has(FAREWELLS) {
            return "Goodbye! Type exit when you're done.".to_string();
        }
        if has(GREETINGS) {
            return "Hello! How can I help you today?".to_string();
        }
        format!("Noted: {}", prompt.trim())
    }
}

/// Number of user prompts recorded in a transcript.
fn count_turns(memory: &str) -> usize {
    memory.lines().filter(|l| l.starts_with("User: ")).count()
}

#[async_trait]
impl PluginAdapter for InternalBackend {
    fn name(&self) -> &str {
        "internal"
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
impl BackendAdapter for InternalBackend {
    async fn generate(&self, prompt: &str, memory: &str) -> Result<String, CrosswayError> {
        Ok(Self::respond(prompt, memory))
    }
}
