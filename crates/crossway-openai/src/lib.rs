// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted-model backend speaking the OpenAI chat completions API.
//!
//! Any OpenAI-compatible endpoint works; point `hosted.base_url` at it.

pub mod client;
pub mod types;

pub use client::OpenAiBackend;
