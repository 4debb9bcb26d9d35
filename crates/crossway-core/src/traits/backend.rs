// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend adapter trait for response-generating backends.

use async_trait::async_trait;

use crate::error::CrosswayError;
use crate::traits::adapter::PluginAdapter;

/// A component that, given a prompt and the conversation transcript, produces a response.
///
/// The router treats every backend uniformly through this trait; backend
/// selection is a lookup by [`BackendId`](crate::BackendId).
#[async_trait]
pub trait BackendAdapter: PluginAdapter {
    /// Generates a response for `prompt`. `memory` is the full transcript
    /// at the start of the turn and may be empty.
    ///
    /// Fails with [`CrosswayError::BackendUnavailable`] or
    /// [`CrosswayError::BackendTimeout`].
    async fn generate(&self, prompt: &str, memory: &str) -> Result<String, CrosswayError>;
}
