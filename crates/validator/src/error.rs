//! Error types for rule evaluation.
//!
//! Two failure modes are kept apart:
//!
//! - [`ValidationFailure`] carries the messages of a record that did not
//!   satisfy its rules. It is an expected outcome of `parse`.
//! - [`ConfigError`] is a programming mistake in the rule set itself:
//!   an unknown rule name, a composition rule without its parameter, a
//!   sub-validator that cannot be resolved, and similar.
//!
//! [`Error`] unifies both for the operations that can produce either.

use std::fmt;

use serde::Serialize;

use crate::Data;
use crate::messages::{FailureSet, MessageBag};

/// Result alias used by `parse` and `get`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

// ============================================================================
// CONFIGURATION ERROR
// ============================================================================

/// A defect in a rule set or in the collaborators wired into a validator.
///
/// These are never produced by bad *data*; they surface the first time the
/// offending rule is evaluated (or at build time when detectable).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A rule name has no registered evaluator.
    #[error("unknown validation rule '{rule}' on field '{field}'")]
    UnknownRule { field: String, rule: String },

    /// A rule that needs a parameter was declared without one.
    #[error("rule '{rule}' on field '{field}' requires a parameter")]
    MissingParameter { field: String, rule: String },

    /// A rule parameter could not be interpreted.
    #[error("rule '{rule}' on field '{field}' has an invalid parameter '{param}'")]
    InvalidParameter {
        field: String,
        rule: String,
        param: String,
    },

    /// A composition rule references a name with no registered sub-validator.
    #[error("validator '{name}' is not registered")]
    UnknownValidator { name: String },

    /// A sub-validator name was found but could not be constructed.
    #[error("validator '{name}' could not be resolved: {reason}")]
    UnresolvableValidator { name: String, reason: String },

    /// Field names are flat; dots are reserved for failure paths.
    #[error("field name '{field}' must not contain '.'")]
    DottedField { field: String },

    /// Field names must be non-empty.
    #[error("field name must not be empty")]
    EmptyField,

    /// Nested composition went deeper than the configured limit.
    #[error("nested validation exceeded the maximum depth of {max_depth}")]
    RecursionLimit { max_depth: usize },

    /// A rule needs a collaborator the validator was not given.
    #[error("rule '{rule}' requires a {collaborator} but none is configured")]
    MissingCollaborator {
        rule: String,
        collaborator: &'static str,
    },

    /// A `regex` rule pattern failed to compile.
    #[error("invalid pattern '{pattern}' on field '{field}': {reason}")]
    InvalidPattern {
        field: String,
        pattern: String,
        reason: String,
    },
}

impl ConfigError {
    /// Creates an unknown-rule error.
    pub fn unknown_rule(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::UnknownRule {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Creates a missing-parameter error.
    pub fn missing_parameter(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::MissingParameter {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Creates an invalid-parameter error.
    pub fn invalid_parameter(
        field: impl Into<String>,
        rule: impl Into<String>,
        param: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            field: field.into(),
            rule: rule.into(),
            param: param.into(),
        }
    }

    /// Creates an unknown-validator error.
    pub fn unknown_validator(name: impl Into<String>) -> Self {
        Self::UnknownValidator { name: name.into() }
    }

    /// Creates an unresolvable-validator error.
    pub fn unresolvable_validator(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvableValidator {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing-collaborator error.
    pub fn missing_collaborator(rule: impl Into<String>, collaborator: &'static str) -> Self {
        Self::MissingCollaborator {
            rule: rule.into(),
            collaborator,
        }
    }
}

// ============================================================================
// VALIDATION FAILURE
// ============================================================================

/// The outcome of a `parse` whose data did not satisfy the rules.
///
/// `Display` joins every message with `;`, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFailure {
    messages: MessageBag,
    failures: FailureSet,
    #[serde(skip)]
    data: Data,
}

impl ValidationFailure {
    /// Wraps the messages and failed rules of an evaluation.
    pub fn new(messages: MessageBag, failures: FailureSet) -> Self {
        Self {
            messages,
            failures,
            data: Data::new(),
        }
    }

    /// Attaches the working data of the failed run.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = data;
        self
    }

    /// The coerced working data at the point evaluation finished.
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Messages keyed by field path.
    pub fn messages(&self) -> &MessageBag {
        &self.messages
    }

    /// Failed rules keyed by field path.
    pub fn failures(&self) -> &FailureSet {
        &self.failures
    }

    /// Consumes the failure, returning its message bag.
    pub fn into_messages(self) -> MessageBag {
        self.messages
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.messages.all() {
            if !first {
                f.write_str(";")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

// ============================================================================
// UNIFIED ERROR
// ============================================================================

/// Either a data failure or a configuration defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The data did not satisfy the rules.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// The rule set or validator wiring is broken.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            Self::Config(_) => None,
        }
    }

    /// Returns the configuration error, if this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(err) => Some(err),
            Self::Validation(_) => None,
        }
    }

    /// `true` when the data failed validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
