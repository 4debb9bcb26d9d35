// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Crossway prompt router.
//!
//! Classification is total and has no error kind. Backend and persistence
//! failures are recovered at the turn boundary; only configuration and
//! startup failures are fatal.

use std::time::Duration;

use thiserror::Error;

use crate::types::BackendId;

/// The primary error type used across all Crossway adapter traits and core operations.
#[derive(Debug, Error)]
pub enum CrosswayError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// The selected backend could not be reached, initialized, or returned an error.
    #[error("backend {backend} unavailable: {message}")]
    BackendUnavailable { backend: BackendId, message: String },

    /// The selected backend did not answer within the bounded window.
    #[error("backend {backend} timed out after {}s", .duration.as_secs())]
    BackendTimeout {
        backend: BackendId,
        duration: Duration,
    },

    /// Transcript persistence failed (load or save).
    #[error("persistence error: {message}")]
    Persistence { message: String },

    /// Local I/O failure outside the memory store (terminal, history file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CrosswayError {
    /// Builds a [`CrosswayError::Persistence`] from any displayable error.
    pub fn persistence(err: impl std::fmt::Display) -> Self {
        CrosswayError::Persistence {
            message: err.to_string(),
        }
    }

    /// Returns the backend a backend-scoped error belongs to.
    pub fn backend(&self) -> Option<BackendId> {
        match self {
            CrosswayError::BackendUnavailable { backend, .. }
            | CrosswayError::BackendTimeout { backend, .. } => Some(*backend),
            _ => None,
        }
    }
}
