// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crossway memory`: print the persisted transcript.

use colored::Colorize;

use crossway_config::model::CrosswayConfig;
use crossway_core::{CrosswayError, MemoryAdapter, PluginAdapter};
use crossway_storage::SqliteMemoryStore;

pub async fn run_memory(config: CrosswayConfig) -> Result<(), CrosswayError> {
    let store = SqliteMemoryStore::open(config.storage.clone()).await?;
    let transcript = store.load().await?;
    store.shutdown().await?;

    if transcript.is_empty() {
        eprintln!("{}", "(no conversation yet)".dimmed());
    } else {
        print!("{transcript}");
    }
    Ok(())
}
