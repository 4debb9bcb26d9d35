// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backends served by a long-lived child process.
//!
//! The retrieval and multi-agent pipelines run as separate programs. Each is
//! spawned once at startup and exchanges one JSON object per line over
//! stdin/stdout (see [`protocol`]).

pub mod backend;
pub mod protocol;

pub use backend::StdioBackend;
