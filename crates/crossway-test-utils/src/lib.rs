// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Crossway integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockBackend`] - Backend with queued responses, failure and delay injection
//! - [`InMemoryStore`] - Transcript store with save failure injection
//! - [`ScriptedIo`] - Session I/O fed from a fixed list of prompts
//! - [`TestHarness`] - Executor wired to one mock per route

pub mod harness;
pub mod mock_backend;
pub mod mock_store;
pub mod scripted_io;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_backend::MockBackend;
pub use mock_store::InMemoryStore;
pub use scripted_io::ScriptedIo;
