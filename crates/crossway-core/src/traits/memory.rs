// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory adapter trait for transcript persistence.

use async_trait::async_trait;

use crate::error::CrosswayError;
use crate::traits::adapter::PluginAdapter;

/// Source of truth for the conversation transcript across restarts.
#[async_trait]
pub trait MemoryAdapter: PluginAdapter {
    /// Loads the persisted transcript, or an empty string if none exists.
    async fn load(&self) -> Result<String, CrosswayError>;

    /// Replaces the persisted transcript with `transcript`.
    ///
    /// Returns only after the write has been applied. Saving the same text
    /// twice leaves `load()` returning that text.
    async fn save(&self, transcript: &str) -> Result<(), CrosswayError>;
}
