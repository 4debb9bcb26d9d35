// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `crossway route`: explain a routing decision without calling any backend.

use colored::Colorize;

use crossway_config::model::CrosswayConfig;
use crossway_router::{RouteClassifier, RouteDecision};

pub fn run_route(config: &CrosswayConfig, prompt: &str) {
    let decision = RouteClassifier::new(&config.routing).decide(prompt);
    println!("{}", describe(&decision));
}

/// `"<backend> (<label>) via rule <n>: <reason>"`, with one-based rule numbers.
pub fn describe(decision: &RouteDecision) -> String {
    format!(
        "{} ({}) via rule {}: {}",
        decision.backend.to_string().bold(),
        decision.backend.label(),
        decision.rule_index + 1,
        decision.reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_the_fired_rule() {
        colored::control::set_override(false);
        let classifier = RouteClassifier::default();

        let text = describe(&classifier.decide("please retrieve the design paper"));
        assert!(text.starts_with("retrieval (RAG) via rule 2: keyword in ["), "{text}");

        let text = describe(&classifier.decide(""));
        assert_eq!(text, "internal (Internal) via rule 3: fewer than 5 words");
    }
}
