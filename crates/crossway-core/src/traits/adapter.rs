// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all adapters must implement.

use async_trait::async_trait;

use crate::error::CrosswayError;
use crate::types::HealthStatus;

/// The base trait for all Crossway adapters.
///
/// Every adapter (backend, memory store) must implement this trait,
/// which provides identity, lifecycle, and health check capabilities.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, CrosswayError>;

    /// Releases any held resources (child processes, connections).
    ///
    /// Must be safe to call more than once.
    async fn shutdown(&self) -> Result<(), CrosswayError>;
}
