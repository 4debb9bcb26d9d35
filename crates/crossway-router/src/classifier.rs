// SPDX-FileCopyrightText: 2026 Crossway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered rule evaluation.
//!
//! Keywords match whole words case-insensitively, where a word is a maximal
//! run of alphanumeric characters: `documentation` does not match `document`.
//! The word-count rule counts whitespace-separated tokens.

use std::collections::BTreeSet;
use std::fmt;

use crossway_config::model::RoutingConfig;
use crossway_core::BackendId;
use tracing::trace;

/// Condition under which a [`RouteRule`] fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleMatcher {
    /// Any of these lowercase words appears in the prompt.
    AnyKeyword(BTreeSet<String>),
    /// The prompt has fewer whitespace-separated words than this.
    FewerWordsThan(usize),
    /// Always fires. Terminates every rule list.
    Always,
}

impl RuleMatcher {
    fn matches(&self, words: &BTreeSet<String>, word_count: usize) -> bool {
        match self {
            RuleMatcher::AnyKeyword(keywords) => !keywords.is_disjoint(words),
            RuleMatcher::FewerWordsThan(threshold) => word_count < *threshold,
            RuleMatcher::Always => true,
        }
    }
}

impl fmt::Display for RuleMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMatcher::AnyKeyword(keywords) => {
                let list: Vec<&str> = keywords.iter().map(String::as_str).collect();
                write!(f, "keyword in [{}]", list.join(", "))
            }
            RuleMatcher::FewerWordsThan(n) => write!(f, "fewer than {n} words"),
            RuleMatcher::Always => write!(f, "fallback"),
        }
    }
}

/// One `{backend, predicate}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub backend: BackendId,
    pub matcher: RuleMatcher,
}

/// The outcome of classifying a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// Selected backend.
    pub backend: BackendId,
    /// Zero-based position of the rule that fired.
    pub rule_index: usize,
    /// Human-readable description of the rule that fired.
    pub reason: String,
}

/// Static, rule-based prompt classifier.
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    rules: Vec<RouteRule>,
}

impl RouteClassifier {
    /// Build the rule list from routing configuration.
    ///
    /// Order: multi-agent keywords, retrieval keywords, word-count threshold,
    /// hosted keywords, local fallback.
    pub fn new(config: &RoutingConfig) -> Self {
        let rules = vec![
            RouteRule {
                backend: BackendId::MultiAgent,
                matcher: RuleMatcher::AnyKeyword(keyword_set(&config.multi_agent_keywords)),
            },
            RouteRule {
                backend: BackendId::Retrieval,
                matcher: RuleMatcher::AnyKeyword(keyword_set(&config.retrieval_keywords)),
            },
            RouteRule {
                backend: BackendId::Internal,
                matcher: RuleMatcher::FewerWordsThan(config.word_threshold),
            },
            RouteRule {
                backend: BackendId::Hosted,
                matcher: RuleMatcher::AnyKeyword(keyword_set(&config.hosted_keywords)),
            },
            RouteRule {
                backend: BackendId::Local,
                matcher: RuleMatcher::Always,
            },
        ];
        Self { rules }
    }

    /// The rules in evaluation order.
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Select the backend for `prompt`.
    pub fn classify(&self, prompt: &str) -> BackendId {
        self.decide(prompt).backend
    }

    /// Select the backend for `prompt` and report which rule fired.
    pub fn decide(&self, prompt: &str) -> RouteDecision {
        let words = words(prompt);
        let word_count = prompt.split_whitespace().count();

        let fired = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matcher.matches(&words, word_count));

        let decision = match fired {
            Some((rule_index, rule)) => RouteDecision {
                backend: rule.backend,
                rule_index,
                reason: rule.matcher.to_string(),
            },
            // Unreachable with a list built by `new`, kept total regardless.
            None => RouteDecision {
                backend: BackendId::Local,
                rule_index: self.rules.len(),
                reason: RuleMatcher::Always.to_string(),
            },
        };

        trace!(
            backend = %decision.backend,
            rule = decision.rule_index,
            word_count,
            "prompt classified"
        );
        decision
    }
}

impl Default for RouteClassifier {
    fn default() -> Self {
        Self::new(&RoutingConfig::default())
    }
}

fn keyword_set(keywords: &[String]) -> BTreeSet<String> {
    keywords.iter().map(|k| k.to_lowercase()).collect()
}

/// Lowercased maximal alphanumeric runs of `text`.
fn words(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(prompt: &str) -> BackendId {
        RouteClassifier::default().classify(prompt)
    }

    #[test]
    fn explain_prompt_goes_to_hosted() {
        assert_eq!(classify("explain quantum tunneling to me"), BackendId::Hosted);
    }

    #[test]
    fn short_explain_prompt_goes_to_internal() {
        // 3 words < 5: the word-count rule precedes the hosted rule.
        assert_eq!(classify("explain quantum tunneling"), BackendId::Internal);
    }

    #[test]
    fn greeting_goes_to_internal() {
        assert_eq!(classify("hi"), BackendId::Internal);
    }

    #[test]
    fn empty_prompt_goes_to_internal() {
        assert_eq!(classify(""), BackendId::Internal);
        assert_eq!(classify("   "), BackendId::Internal);
    }

    #[test]
    fn retrieval_keywords_beat_word_count() {
        assert_eq!(
            classify("please retrieve the design paper"),
            BackendId::Retrieval
        );
        assert_eq!(classify("paper"), BackendId::Retrieval);
    }

    #[test]
    fn analytical_keywords_win_over_everything() {
        assert_eq!(classify("analyze"), BackendId::MultiAgent);
        assert_eq!(
            classify("research the design paper and explain the document"),
            BackendId::MultiAgent
        );
    }

    #[test]
    fn long_prompt_without_keywords_falls_back_to_local() {
        assert_eq!(
            classify("write me a short poem about the autumn sea"),
            BackendId::Local
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(classify("ANALYZE this"), BackendId::MultiAgent);
        assert_eq!(
            classify("Could you Explain how tides work exactly"),
            BackendId::Hosted
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        // "documentation" contains "document"; "redesigned" contains "design".
        assert_eq!(
            classify("where is the documentation for the redesigned api"),
            BackendId::Local
        );
        assert_eq!(classify("the paperwork is done now ok"), BackendId::Local);
    }

    #[test]
    fn punctuation_delimits_words() {
        assert_eq!(
            classify("could you retrieve: document, please?"),
            BackendId::Retrieval
        );
        assert_eq!(classify("(analyze)"), BackendId::MultiAgent);
    }

    #[test]
    fn custom_threshold_is_respected() {
        let config = RoutingConfig {
            word_threshold: 2,
            ..RoutingConfig::default()
        };
        let classifier = RouteClassifier::new(&config);
        assert_eq!(classifier.classify("hello"), BackendId::Internal);
        assert_eq!(classifier.classify("hello there"), BackendId::Local);
    }

    #[test]
    fn decision_reports_fired_rule() {
        let decision = RouteClassifier::default().decide("please retrieve the design paper");
        assert_eq!(decision.rule_index, 1);
        assert!(decision.reason.starts_with("keyword in ["));

        let fallback = RouteClassifier::default().decide("tell me a story about a tiny dragon");
        assert_eq!(fallback.rule_index, 4);
        assert_eq!(fallback.reason, "fallback");
    }

    #[test]
    fn rule_list_ends_with_catch_all() {
        let classifier = RouteClassifier::default();
        let last = classifier.rules().last().unwrap();
        assert_eq!(last.matcher, RuleMatcher::Always);
        assert_eq!(last.backend, BackendId::Local);
    }
}
