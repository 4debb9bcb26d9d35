// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crossway shell` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. The editor
//! lives on its own thread so a termination signal is honored while the
//! session waits for input.

use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;
use std::thread::JoinHandle;

use async_trait::async_trait;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crossway_agent::shutdown::install_signal_handler;
use crossway_agent::{Session, SessionIo, SessionSettings, TurnReport};
use crossway_config::model::CrosswayConfig;
use crossway_core::CrosswayError;

use crate::backends;

/// Runs the `crossway shell` interactive REPL.
pub async fn run_shell(config: CrosswayConfig) -> Result<(), CrosswayError> {
    let executor = backends::connect(&config).await?;
    let settings = SessionSettings::from_config(&config.session);
    let session = Session::start(executor, settings)
        .await?
        .with_cancellation(install_signal_handler());

    let mut io = ShellIo::start(
        format!("{}> ", config.agent.name.green()),
        config.session.history_file.as_ref().map(PathBuf::from),
    )?;

    println!("{}", "crossway shell".bold().green());
    let exit_hint = config
        .session
        .exit_tokens
        .iter()
        .map(|t| t.yellow().to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    println!("Type {exit_hint} to leave.\n");

    let summary = session.run(&mut io).await;
    io.close();

    if summary.unsaved_at_exit {
        eprintln!(
            "{}",
            "warning: the latest transcript could not be saved".yellow()
        );
    }
    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Print one turn result: responses to stdout, problems to stderr.
///
/// `more_turns` is false for one-shot runs, where a failed save has already
/// been retried by the time the report is printed.
pub fn print_report(report: &TurnReport, more_turns: bool) {
    match report {
        TurnReport::Response { route, text, .. } => {
            println!("{} {text}", format!("[{}]", route.label()).cyan());
            if let Some(notice) = unsaved_notice(report, more_turns) {
                eprintln!("{}", notice.yellow());
            }
        }
        TurnReport::Failed { message, .. } => {
            eprintln!("{}: {message}", "error".red());
        }
    }
}

fn unsaved_notice(report: &TurnReport, more_turns: bool) -> Option<&'static str> {
    match report {
        TurnReport::Response { unsaved: true, .. } if more_turns => {
            Some("warning: transcript not saved; it will be retried after the next turn")
        }
        _ => None,
    }
}

enum Line {
    Input(String),
    Closed,
    Failed(String),
}

/// [`SessionIo`] over a readline editor running on a dedicated thread.
struct ShellIo {
    requests: Option<std_mpsc::Sender<()>>,
    lines: mpsc::Receiver<Line>,
    worker: Option<JoinHandle<()>>,
    pending: bool,
}

impl ShellIo {
    fn start(prompt: String, history: Option<PathBuf>) -> Result<Self, CrosswayError> {
        let (request_tx, request_rx) = std_mpsc::channel();
        let (line_tx, line_rx) = mpsc::channel(1);
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let worker = std::thread::Builder::new()
            .name("crossway-readline".to_string())
            .spawn(move || readline_worker(prompt, history, request_rx, line_tx, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                requests: Some(request_tx),
                lines: line_rx,
                worker: Some(worker),
                pending: false,
            }),
            Ok(Err(message)) => Err(CrosswayError::Internal(format!(
                "failed to initialize readline: {message}"
            ))),
            Err(_) => Err(CrosswayError::Internal(
                "readline thread exited during startup".to_string(),
            )),
        }
    }

    /// Stop the editor thread and let it write history.
    ///
    /// A thread still blocked on a read (after a signal) is left behind.
    fn close(mut self) {
        self.requests.take();
        if self.pending {
            return;
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("readline thread panicked");
            }
        }
    }
}

#[async_trait]
impl SessionIo for ShellIo {
    async fn next_prompt(&mut self) -> Option<String> {
        let requests = self.requests.as_ref()?;
        if requests.send(()).is_err() {
            return None;
        }
        self.pending = true;
        let line = self.lines.recv().await;
        self.pending = false;
        match line? {
            Line::Input(text) => Some(text),
            Line::Closed => None,
            Line::Failed(message) => {
                eprintln!("{}: {message}", "error".red());
                None
            }
        }
    }

    async fn report(&mut self, report: TurnReport) {
        print_report(&report, true);
    }
}

fn readline_worker(
    prompt: String,
    history: Option<PathBuf>,
    requests: std_mpsc::Receiver<()>,
    lines: mpsc::Sender<Line>,
    ready: std_mpsc::Sender<Result<(), String>>,
) {
    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(e) => {
            let _ = ready.send(Err(e.to_string()));
            return;
        }
    };
    if let Some(path) = &history {
        if let Err(e) = rl.load_history(path) {
            debug!(path = %path.display(), error = %e, "no readline history loaded");
        }
    }
    let _ = ready.send(Ok(()));

    while requests.recv().is_ok() {
        let line = match rl.readline(&prompt) {
            Ok(text) => {
                if !text.trim().is_empty() {
                    let _ = rl.add_history_entry(text.as_str());
                }
                Line::Input(text)
            }
            // Ctrl+C and Ctrl+D end the session like an exit token.
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Line::Closed,
            Err(e) => Line::Failed(e.to_string()),
        };
        let last = !matches!(line, Line::Input(_));
        if lines.blocking_send(line).is_err() || last {
            break;
        }
    }

    if let Some(path) = &history {
        if let Err(e) = rl.save_history(path) {
            warn!(path = %path.display(), error = %e, "failed to save readline history");
        }
    }
}
