// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local-model backend talking to an Ollama server.

pub mod client;
pub mod types;

pub use client::OllamaBackend;
