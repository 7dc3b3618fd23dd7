//! Path-keyed failure aggregation.
//!
//! [`MessageBag`] holds the human-facing messages and [`FailureSet`] the
//! names of the rules that failed. Both are keyed by dotted paths
//! (`nested.0.age`) and both preserve insertion order: first by path, then
//! within a path. Merging appends and never replaces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ============================================================================
// MESSAGE BAG
// ============================================================================

/// Ordered mapping from path to the messages recorded for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageBag {
    messages: IndexMap<String, Vec<String>>,
}

impl MessageBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at `path`.
    pub fn add(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(path.into())
            .or_default()
            .push(message.into());
    }

    /// Appends every message of `other`, keeping its order.
    pub fn merge(&mut self, other: &Self) {
        for (path, messages) in &other.messages {
            self.messages
                .entry(path.clone())
                .or_default()
                .extend(messages.iter().cloned());
        }
    }

    /// Appends every message of `other` under `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Self) {
        for (path, messages) in &other.messages {
            self.messages
                .entry(format!("{prefix}.{path}"))
                .or_default()
                .extend(messages.iter().cloned());
        }
    }

    /// Total number of messages across all paths.
    pub fn count(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    /// Every message, path by path.
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.messages.values().flatten().map(String::as_str)
    }

    /// Messages recorded at `path`.
    pub fn get(&self, path: &str) -> &[String] {
        self.messages
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First message recorded at `path`.
    pub fn first(&self, path: &str) -> Option<&str> {
        self.get(path).first().map(String::as_str)
    }

    /// `true` if `path` has at least one message.
    pub fn has(&self, path: &str) -> bool {
        !self.get(path).is_empty()
    }

    /// Paths in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// The underlying path map.
    pub fn messages(&self) -> &IndexMap<String, Vec<String>> {
        &self.messages
    }

    /// `true` if no messages are recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates `(path, messages)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(path, messages)| (path.as_str(), messages.as_slice()))
    }
}

// ============================================================================
// FAILURE SET
// ============================================================================

/// A rule that failed, with the parameters it was declared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRule {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl FailedRule {
    /// Creates a failed-rule entry.
    pub fn new(rule: impl Into<String>, params: &[String]) -> Self {
        Self {
            rule: rule.into(),
            params: params.to_vec(),
        }
    }
}

/// Ordered mapping from path to the rules that failed there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureSet {
    failures: IndexMap<String, SmallVec<[FailedRule; 2]>>,
}

impl FailureSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `rule` failed at `path`.
    pub fn record(&mut self, path: impl Into<String>, rule: FailedRule) {
        self.failures.entry(path.into()).or_default().push(rule);
    }

    /// Copies every failure of `other` under `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: &Self) {
        for (path, rules) in &other.failures {
            self.failures
                .entry(format!("{prefix}.{path}"))
                .or_default()
                .extend(rules.iter().cloned());
        }
    }

    /// `true` if anything failed at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.failures.contains_key(path)
    }

    /// Rules that failed at `path`.
    pub fn rules_for(&self, path: &str) -> &[FailedRule] {
        self.failures
            .get(path)
            .map(|rules| rules.as_slice())
            .unwrap_or_default()
    }

    /// `true` if `rule` failed at `path`.
    pub fn has_rule(&self, path: &str, rule: &str) -> bool {
        self.rules_for(path).iter().any(|failed| failed.rule == rule)
    }

    /// Failed paths in insertion order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.failures.keys().map(String::as_str)
    }

    /// Number of failed paths.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// `true` if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Iterates `(path, rules)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FailedRule])> {
        self.failures
            .iter()
            .map(|(path, rules)| (path.as_str(), rules.as_slice()))
    }
}
