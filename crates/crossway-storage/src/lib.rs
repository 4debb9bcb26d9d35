// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Crossway conversation transcript.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer model via `tokio-rusqlite`: every statement runs on one
//! background thread, so saves are applied in the order they are issued.

pub mod database;
pub mod migrations;
pub mod store;

pub use database::Database;
pub use store::SqliteMemoryStore;
