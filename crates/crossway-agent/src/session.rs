// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session loop: a strictly sequential series of turns over one transcript.
//!
//! States: AwaitingPrompt -> Dispatching -> Reporting -> AwaitingPrompt, with
//! AwaitingPrompt -> Terminated on an exit token, end of input, or
//! cancellation. Entering Terminated releases every backend.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crossway_config::model::SessionConfig;
use crossway_core::{BackendId, CrosswayError, MemoryAdapter, PluginAdapter};

use crate::turn::{TurnExecutor, TurnOutcome};

/// States in the session FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the next prompt.
    AwaitingPrompt,
    /// A turn is running.
    Dispatching,
    /// The turn finished and its result is being surfaced.
    Reporting,
    /// The session ended and its backends have been released.
    Terminated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::AwaitingPrompt => write!(f, "awaiting_prompt"),
            SessionState::Dispatching => write!(f, "dispatching"),
            SessionState::Reporting => write!(f, "reporting"),
            SessionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// What the caller is told after each turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReport {
    /// The backend answered. `unsaved` means the transcript could not be
    /// persisted and the on-disk copy is behind.
    Response {
        route: BackendId,
        text: String,
        unsaved: bool,
    },
    /// The turn failed; the transcript is unchanged.
    Failed {
        backend: Option<BackendId>,
        message: String,
    },
}

/// Source of prompts and sink for turn reports.
#[async_trait]
pub trait SessionIo: Send {
    /// Next line of input, or `None` at end of input.
    async fn next_prompt(&mut self) -> Option<String>;

    async fn report(&mut self, report: TurnReport);
}

/// Session behavior taken from `[session]`.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    exit_tokens: Vec<String>,
}

impl SessionSettings {
    pub fn new<I, S>(exit_tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exit_tokens: exit_tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.exit_tokens)
    }

    /// Exit tokens match the whole trimmed line, ignoring case.
    pub fn is_exit(&self, prompt: &str) -> bool {
        let prompt = prompt.trim().to_lowercase();
        self.exit_tokens.iter().any(|t| *t == prompt)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

/// Counters for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns_completed: u64,
    pub turns_failed: u64,
    /// The final transcript never reached the store.
    pub unsaved_at_exit: bool,
}

pub struct Session {
    executor: TurnExecutor,
    settings: SessionSettings,
    memory: String,
    state: SessionState,
    diverged: bool,
    cancel: CancellationToken,
    summary: SessionSummary,
}

impl Session {
    /// Load the persisted transcript once and get ready for the first prompt.
    ///
    /// If the load fails, backends and the store are released before the
    /// error is returned.
    pub async fn start(executor: TurnExecutor, settings: SessionSettings) -> Result<Self, CrosswayError> {
        let memory = match executor.store().load().await {
            Ok(memory) => memory,
            Err(e) => {
                error!(error = %e, "transcript could not be loaded, releasing backends");
                executor.backends().shutdown_all().await;
                if let Err(e) = executor.store().shutdown().await {
                    warn!(error = %e, "memory store shutdown failed");
                }
                return Err(e);
            }
        };
        info!(bytes = memory.len(), "transcript loaded");
        Ok(Self {
            executor,
            settings,
            memory,
            state: SessionState::AwaitingPrompt,
            diverged: false,
            cancel: CancellationToken::new(),
            summary: SessionSummary::default(),
        })
    }

    /// Terminate the session when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The in-process transcript.
    pub fn memory(&self) -> &str {
        &self.memory
    }

    /// True while the store holds an older transcript than [`Session::memory`].
    pub fn is_diverged(&self) -> bool {
        self.diverged
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Run one turn for `prompt` and fold its result into the session.
    ///
    /// Returns `None` for a blank prompt, which does not start a turn.
    pub async fn step(&mut self, prompt: &str) -> Option<TurnReport> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        self.state = SessionState::Dispatching;
        let result = self.executor.execute(prompt, &self.memory).await;
        Some(self.absorb(result))
    }

    /// Drive turns from `io` until an exit token, end of input, or cancellation.
    pub async fn run<I: SessionIo>(mut self, io: &mut I) -> SessionSummary {
        loop {
            self.state = SessionState::AwaitingPrompt;
            let prompt = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                prompt = io.next_prompt() => prompt,
            };
            let Some(prompt) = prompt else {
                debug!("input closed");
                break;
            };
            if self.settings.is_exit(&prompt) {
                debug!("exit token received");
                break;
            }
            let prompt = prompt.trim();
            if prompt.is_empty() {
                continue;
            }

            self.state = SessionState::Dispatching;
            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("turn abandoned on shutdown");
                    break;
                }
                result = self.executor.execute(prompt, &self.memory) => result,
            };
            let report = self.absorb(result);
            io.report(report).await;
        }
        self.finish().await
    }

    /// Enter `Terminated`: flush a diverged transcript, then release backends and the store.
    pub async fn finish(mut self) -> SessionSummary {
        self.state = SessionState::Terminated;

        if self.diverged {
            match self.executor.store().save(&self.memory).await {
                Ok(()) => {
                    info!(bytes = self.memory.len(), "diverged transcript flushed on exit");
                    self.diverged = false;
                }
                Err(e) => {
                    error!(error = %e, "transcript could not be saved on exit; the stored copy is behind");
                    self.summary.unsaved_at_exit = true;
                }
            }
        }

        self.executor.backends().shutdown_all().await;
        if let Err(e) = self.executor.store().shutdown().await {
            warn!(error = %e, "memory store shutdown failed");
        }

        info!(
            completed = self.summary.turns_completed,
            failed = self.summary.turns_failed,
            "session terminated"
        );
        self.summary
    }

    fn absorb(&mut self, result: Result<TurnOutcome, CrosswayError>) -> TurnReport {
        self.state = SessionState::Reporting;
        match result {
            Ok(outcome) => {
                self.summary.turns_completed += 1;
                self.memory = outcome.memory;
                let unsaved = match outcome.save_error {
                    None => {
                        if self.diverged {
                            info!("transcript saved, store caught up");
                        }
                        self.diverged = false;
                        false
                    }
                    Some(e) => {
                        warn!(error = %e, "transcript diverged from store");
                        self.diverged = true;
                        true
                    }
                };
                TurnReport::Response {
                    route: outcome.route,
                    text: outcome.response,
                    unsaved,
                }
            }
            Err(e) => {
                self.summary.turns_failed += 1;
                TurnReport::Failed {
                    backend: e.backend(),
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_state_display() {
        assert_eq!(SessionState::AwaitingPrompt.to_string(), "awaiting_prompt");
        assert_eq!(SessionState::Dispatching.to_string(), "dispatching");
        assert_eq!(SessionState::Reporting.to_string(), "reporting");
        assert_eq!(SessionState::Terminated.to_string(), "terminated");
    }

    #[test]
    fn exit_tokens_ignore_case_and_padding() {
        let settings = SessionSettings::default();
        assert!(settings.is_exit("exit"));
        assert!(settings.is_exit("  QUIT \n"));
        assert!(!settings.is_exit("exit now"));
        assert!(!settings.is_exit(""));
    }

    #[test]
    fn custom_exit_tokens_are_normalized() {
        let settings = SessionSettings::new([" Stop "]);
        assert!(settings.is_exit("stop"));
        assert!(!settings.is_exit("exit"));
    }
}
