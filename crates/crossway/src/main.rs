// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crossway - route prompts to the backend best suited to answer them.
//!
//! This is the binary entry point.

mod ask;
mod backends;
mod memory;
mod route;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// Crossway - route prompts to the backend best suited to answer them.
#[derive(Parser, Debug)]
#[command(name = "crossway", version, about, long_about = None)]
struct Cli {
    /// Config file layered over the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive session (the default).
    Shell,
    /// Run a single turn and print the response.
    Ask {
        /// Prompt text; multiple arguments are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,
    },
    /// Show which backend a prompt would be routed to, without calling it.
    Route {
        /// Prompt text; multiple arguments are joined with spaces.
        prompt: Vec<String>,
    },
    /// Print the persisted transcript.
    Memory,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match crossway_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            crossway_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);
    tracing::debug!(agent = %config.agent.name, "config loaded");

    let result = match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => shell::run_shell(config).await.map(|()| true),
        Commands::Ask { prompt } => ask::run_ask(config, &prompt.join(" ")).await,
        Commands::Route { prompt } => {
            route::run_route(&config, &prompt.join(" "));
            Ok(true)
        }
        Commands::Memory => memory::run_memory(config).await.map(|()| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {e}", "error".red());
            std::process::exit(1);
        }
    }
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise `agent.log_level` applies to crossway crates
/// and everything else logs warnings only. Output goes to stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn default_directives(log_level: &str) -> String {
    [
        "crossway",
        "crossway_agent",
        "crossway_router",
        "crossway_storage",
        "crossway_openai",
        "crossway_ollama",
        "crossway_stdio",
    ]
    .iter()
    .map(|target| format!("{target}={log_level}"))
    .chain(std::iter::once("warn".to_string()))
    .collect::<Vec<_>>()
    .join(",")
}
