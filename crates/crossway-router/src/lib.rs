// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt classification for the Crossway router.
//!
//! [`RouteClassifier`] maps a prompt to exactly one [`BackendId`] by
//! evaluating a fixed, ordered list of rules. The first matching rule wins
//! and the list always ends with a catch-all, so classification never fails.
//! No I/O, no network, no latency.
//!
//! [`BackendId`]: crossway_core::BackendId

pub mod classifier;

pub use classifier::{RouteClassifier, RouteDecision, RouteRule, RuleMatcher};
