// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session I/O driven by a fixed script.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crossway_agent::{SessionIo, TurnReport};

/// Feeds prompts from a list and captures every report.
///
/// Returns `None` once the script runs out, unless it was told to hang,
/// in which case it waits until cancelled.
#[derive(Default)]
pub struct ScriptedIo {
    prompts: VecDeque<String>,
    reports: Vec<TurnReport>,
    hang_when_empty: Option<CancellationToken>,
}

impl ScriptedIo {
    pub fn new<I, S>(prompts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompts: prompts.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// After the script is exhausted, block until `token` is cancelled.
    pub fn hang_until(mut self, token: CancellationToken) -> Self {
        self.hang_when_empty = Some(token);
        self
    }

    pub fn reports(&self) -> &[TurnReport] {
        &self.reports
    }

    /// Response texts of successful turns, in order.
    pub fn responses(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                TurnReport::Response { text, .. } => Some(text.as_str()),
                TurnReport::Failed { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl SessionIo for ScriptedIo {
    async fn next_prompt(&mut self) -> Option<String> {
        if let Some(prompt) = self.prompts.pop_front() {
            return Some(prompt);
        }
        if let Some(token) = &self.hang_when_empty {
            token.cancelled().await;
        }
        None
    }

    async fn report(&mut self, report: TurnReport) {
        self.reports.push(report);
    }
}
