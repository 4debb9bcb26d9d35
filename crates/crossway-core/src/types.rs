// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Crossway router.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies one of the response-generating backends a prompt can be routed to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BackendId {
    /// Fast heuristic responder running in-process.
    Internal,
    /// Remote hosted model.
    Hosted,
    /// Small local model; the fallback route.
    Local,
    /// Retrieval-augmented pipeline.
    Retrieval,
    /// Multi-agent pipeline for multi-step analytical tasks.
    MultiAgent,
}

impl BackendId {
    /// Every backend, in startup construction order.
    pub const ALL: [BackendId; 5] = [
        BackendId::Internal,
        BackendId::Hosted,
        BackendId::Local,
        BackendId::Retrieval,
        BackendId::MultiAgent,
    ];

    /// Speaker label written into the transcript for responses from this backend.
    ///
    /// These strings are part of the persisted transcript format and must not change.
    pub fn label(self) -> &'static str {
        match self {
            BackendId::Internal => "Internal",
            BackendId::Hosted => "OpenAI",
            BackendId::Local => "LLaMA",
            BackendId::Retrieval => "RAG",
            BackendId::MultiAgent => "CrewAI",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn display_and_from_str_round_trip() {
        for id in BackendId::ALL {
            let parsed = BackendId::from_str(&id.to_string()).expect("should parse back");
            assert_eq!(id, parsed);
        }
        assert_eq!(BackendId::MultiAgent.to_string(), "multi_agent");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&BackendId::MultiAgent).unwrap();
        assert_eq!(json, "\"multi_agent\"");
        let parsed: BackendId = serde_json::from_str("\"retrieval\"").unwrap();
        assert_eq!(parsed, BackendId::Retrieval);
    }

    #[test]
    fn labels_are_distinct() {
        let mut labels: Vec<&str> = BackendId::ALL.iter().map(|id| id.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), BackendId::ALL.len());
        assert_eq!(BackendId::Hosted.label(), "OpenAI");
    }
}
