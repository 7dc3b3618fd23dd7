//! Single-field convenience wrapper.
//!
//! [`FieldValidator`] validates one key of a record without declaring a full
//! rule set. It builds a one-field rule set on the fly and evaluates it
//! against `{key: data[key]}`, or `{}` when the key is absent, so an absent
//! optional field passes its type rules while `required` still applies.

use serde_json::Value;

use crate::Data;
use crate::context::Evaluation;
use crate::error::{ConfigError, Error, Result};
use crate::messages::MessageBag;
use crate::rule::RuleSpec;
use crate::validator::{RuleSet, Validator};

/// Validates or extracts a single key.
///
/// # Examples
///
/// ```
/// use gatekeep_validator::FieldValidator;
/// use serde_json::json;
///
/// let fields = FieldValidator::new();
/// let data = json!({"foo": "42"});
/// let data = data.as_object().unwrap();
///
/// assert!(fields.verify(data, "foo", "numeric").unwrap());
/// assert_eq!(fields.get(data, "foo", "numeric").unwrap(), Some(json!(42)));
/// ```
#[derive(Debug, Clone)]
pub struct FieldValidator {
    base: Validator,
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldValidator {
    /// Uses the built-in rules and English messages.
    pub fn new() -> Self {
        Self {
            base: Validator::new(RuleSet::default()),
        }
    }

    /// Borrows collaborators, custom rules, messages and sub-validators
    /// from `base`.
    pub fn with_validator(base: Validator) -> Self {
        Self { base }
    }

    /// Evaluates `rules` against `data[key]`, treating an absent key as absent.
    pub fn check(
        &self,
        data: &Data,
        key: &str,
        rules: impl Into<RuleSpec>,
    ) -> std::result::Result<Evaluation, ConfigError> {
        self.evaluate(key, data.get(key), rules.into())
    }

    /// `true` if `data[key]` satisfies `rules`.
    pub fn verify(
        &self,
        data: &Data,
        key: &str,
        rules: impl Into<RuleSpec>,
    ) -> std::result::Result<bool, ConfigError> {
        Ok(self.check(data, key, rules)?.is_valid())
    }

    /// Like [`verify`](Self::verify), appending any messages to `messages`.
    pub fn verify_into(
        &self,
        data: &Data,
        key: &str,
        rules: impl Into<RuleSpec>,
        messages: &mut MessageBag,
    ) -> std::result::Result<bool, ConfigError> {
        let evaluation = self.check(data, key, rules)?;
        messages.merge(evaluation.messages());
        Ok(evaluation.is_valid())
    }

    /// Validates `data[key]` and returns its coerced value.
    ///
    /// A null value counts as absent. Returns `Ok(None)` when the key is
    /// absent (or cleared by coercion) and the rules allow it.
    pub fn get(&self, data: &Data, key: &str, rules: impl Into<RuleSpec>) -> Result<Option<Value>> {
        let value = data.get(key).filter(|value| !value.is_null());
        let evaluation = self.evaluate(key, value, rules.into())?;
        if !evaluation.is_valid() {
            return Err(Error::Validation(evaluation.into_failure()));
        }
        Ok(evaluation.into_data().remove(key))
    }

    fn evaluate(
        &self,
        key: &str,
        value: Option<&Value>,
        spec: RuleSpec,
    ) -> std::result::Result<Evaluation, ConfigError> {
        let rules = self.base.rules().with_single_field(key, spec)?;
        let mut projected = Data::new();
        if let Some(value) = value {
            projected.insert(key.to_owned(), value.clone());
        }
        self.base.with_rules(rules).evaluate(&projected)
    }
}
