//! Per-call evaluation state.
//!
//! An [`EvaluationContext`] owns the working copy of the input together with
//! the failures and messages recorded so far. One is created for every
//! `verify`/`parse` call and for every nested sub-evaluation, so coercion
//! never touches the caller's data or another run's state.

use serde_json::Value;
use tracing::debug;

use crate::Data;
use crate::error::{ConfigError, ValidationFailure};
use crate::messages::{FailedRule, FailureSet, MessageBag};
use crate::rule::Rule;
use crate::validator::Validator;

/// Mutable state of one evaluation run.
#[derive(Debug)]
pub struct EvaluationContext<'v> {
    validator: &'v Validator,
    data: Data,
    failures: FailureSet,
    messages: MessageBag,
    depth: usize,
}

impl<'v> EvaluationContext<'v> {
    pub(crate) fn new(validator: &'v Validator, data: Data, depth: usize) -> Self {
        Self {
            validator,
            data,
            failures: FailureSet::new(),
            messages: MessageBag::new(),
            depth,
        }
    }

    /// The validator driving this run.
    pub fn validator(&self) -> &'v Validator {
        self.validator
    }

    /// Composition depth: 0 for a top-level call.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Working data.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Working data, mutably.
    pub fn data_mut(&mut self) -> &mut Data {
        &mut self.data
    }

    /// Current value of `field`.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// `true` if `field` is present (null counts as present).
    pub fn is_present(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    /// Overwrites `field` with a coerced value.
    pub fn set_value(&mut self, field: &str, value: Value) {
        self.data.insert(field.to_owned(), value);
    }

    /// Removes `field` from the working data.
    pub fn remove_value(&mut self, field: &str) -> Option<Value> {
        self.data.shift_remove(field)
    }

    /// Failed rules recorded so far.
    pub fn failures(&self) -> &FailureSet {
        &self.failures
    }

    /// Messages recorded so far.
    pub fn messages(&self) -> &MessageBag {
        &self.messages
    }

    /// Records `rule` as failed on `field` and renders its message.
    pub fn record_failure(&mut self, field: &str, rule: &Rule) {
        let message = self.validator.render_message(field, rule);
        self.failures
            .record(field, FailedRule::new(rule.name(), rule.params()));
        self.messages.add(field, message);
    }

    /// Appends a message without a matching failed rule.
    pub fn add_message(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.messages.add(path, message);
    }

    /// Runs `validator` on `data` one composition level below this run.
    ///
    /// Rules that delegate to another validator go through here so the
    /// child sees the parent's depth and `max_depth` bounds cyclic schemas.
    pub fn evaluate_child(
        &self,
        validator: &Validator,
        data: &Data,
    ) -> Result<Evaluation, ConfigError> {
        validator.evaluate_at_depth(data, self.depth + 1)
    }

    /// Copies a sub-evaluation's failures and messages under `prefix`.
    pub fn splice(&mut self, prefix: &str, child: &Evaluation) {
        self.failures.merge_prefixed(prefix, &child.failures);
        self.messages.merge_prefixed(prefix, &child.messages);
        debug!(
            prefix,
            failures = child.failures.len(),
            depth = self.depth,
            "spliced nested failures"
        );
    }

    pub(crate) fn into_evaluation(self) -> Evaluation {
        Evaluation {
            data: self.data,
            failures: self.failures,
            messages: self.messages,
        }
    }
}

/// Result of one evaluation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    data: Data,
    failures: FailureSet,
    messages: MessageBag,
}

impl Evaluation {
    /// `true` when no rule failed.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Coerced working data, including undeclared fields.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Consumes the evaluation, returning the coerced data.
    pub fn into_data(self) -> Data {
        self.data
    }

    /// Failed rules by path.
    pub fn failures(&self) -> &FailureSet {
        &self.failures
    }

    /// Messages by path.
    pub fn messages(&self) -> &MessageBag {
        &self.messages
    }

    /// Converts into the error surfaced by `parse`.
    pub fn into_failure(self) -> ValidationFailure {
        ValidationFailure::new(self.messages, self.failures).with_data(self.data)
    }

    /// Splits into data, failures and messages.
    pub fn into_parts(self) -> (Data, FailureSet, MessageBag) {
        (self.data, self.failures, self.messages)
    }
}
