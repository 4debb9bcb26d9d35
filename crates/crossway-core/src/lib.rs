// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Crossway prompt router.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Crossway workspace. Every response
//! backend and memory store implements a trait defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CrosswayError;
pub use types::{BackendId, HealthStatus};

pub use traits::{BackendAdapter, MemoryAdapter, PluginAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_scoped_errors_expose_backend() {
        let unavailable = CrosswayError::BackendUnavailable {
            backend: BackendId::Retrieval,
            message: "pipe closed".into(),
        };
        let timeout = CrosswayError::BackendTimeout {
            backend: BackendId::Hosted,
            duration: std::time::Duration::from_secs(3),
        };
        assert_eq!(unavailable.backend(), Some(BackendId::Retrieval));
        assert_eq!(timeout.backend(), Some(BackendId::Hosted));
        assert_eq!(
            CrosswayError::Persistence {
                message: "disk full".into()
            }
            .backend(),
            None
        );
    }

    #[test]
    fn error_messages_name_the_backend() {
        let err = CrosswayError::BackendTimeout {
            backend: BackendId::MultiAgent,
            duration: std::time::Duration::from_secs(30),
        };
        assert_eq!(
            err.to_string(),
            "backend multi_agent timed out after 30s"
        );
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_backend_adapter<T: BackendAdapter>() {}
        fn _assert_memory_adapter<T: MemoryAdapter>() {}
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
    }
}
