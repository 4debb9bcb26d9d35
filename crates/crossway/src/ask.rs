// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crossway ask`: one turn, non-interactively.

use colored::Colorize;

use crossway_agent::{Session, SessionSettings, TurnReport};
use crossway_config::model::CrosswayConfig;
use crossway_core::CrosswayError;

use crate::backends;
use crate::shell::print_report;

/// Run one turn for `prompt` and print the result.
///
/// Returns `Ok(false)` when the turn failed; the error has been printed.
pub async fn run_ask(config: CrosswayConfig, prompt: &str) -> Result<bool, CrosswayError> {
    if prompt.trim().is_empty() {
        return Err(CrosswayError::Config("prompt is empty".to_string()));
    }

    let executor = backends::connect(&config).await?;
    let mut session = Session::start(executor, SessionSettings::from_config(&config.session)).await?;
    let report = session.step(prompt).await;
    let summary = session.finish().await;

    let Some(report) = report else {
        return Ok(true);
    };
    print_report(&report, false);
    if summary.unsaved_at_exit {
        eprintln!(
            "{}",
            "warning: the transcript could not be saved".yellow()
        );
    }
    Ok(matches!(report, TurnReport::Response { .. }))
}
