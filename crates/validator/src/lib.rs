//! # gatekeep-validator
//!
//! Declarative validation for keyed JSON records.
//!
//! Each field of a record gets a pipe-separated rule string. Evaluating a
//! record runs every field's rules against a private working copy, coerces
//! values that pass a type rule to their canonical form, and collects
//! failures and messages under dotted paths.
//!
//! ## Quick Start
//!
//! ```
//! use gatekeep_validator::prelude::*;
//! use serde_json::json;
//!
//! let simple = Validator::new(
//!     RuleSet::builder()
//!         .rule("age", "required|numeric|min:5")
//!         .rule("size", "numeric|min:10")
//!         .build()
//!         .unwrap(),
//! );
//! let parent = Validator::new(
//!     RuleSet::builder()
//!         .rule("nested", "required|array|nested:simple")
//!         .validator("simple", simple)
//!         .build()
//!         .unwrap(),
//! );
//!
//! let data = json!({"nested": {"age": 1, "size": 2}});
//! let evaluation = parent.evaluate(data.as_object().unwrap()).unwrap();
//! assert!(!evaluation.is_valid());
//! assert_eq!(
//!     evaluation.failures().paths().collect::<Vec<_>>(),
//!     ["nested.age", "nested.size"]
//! );
//! ```
//!
//! ## Built-in Rules
//!
//! - **Presence** (implicit): `required`, `present`, `filled`, `accepted`,
//!   `required_with`, `required_without`; markers `nullable` and `bail`
//! - **Types** (implicit, coercing): `boolean`, `integer`, `numeric`,
//!   `string`, `array`
//! - **Size**: `min`, `max`, `between`, `size`, `digits`
//! - **Format**: `regex`, `not_regex`, `email`, `alpha`, `alpha_num`,
//!   `alpha_dash`
//! - **Comparison**: `in`, `not_in`, `same`, `different`
//! - **Lookup**: `exists` (needs an [`ExistenceChecker`])
//! - **Composition**: `nested`, `nested_collection`
//!
//! Custom rules are registered through [`RuleRegistry::register`] or
//! [`ValidatorBuilder::custom_rule`].

pub mod coerce;
pub mod config;
pub mod context;
pub mod error;
pub mod field;
pub mod format;
pub mod messages;
pub mod prelude;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod validator;

/// A record under validation.
pub type Data = serde_json::Map<String, serde_json::Value>;

pub use config::EngineConfig;
pub use context::{Evaluation, EvaluationContext};
pub use error::{ConfigError, Error, Result, ValidationFailure};
pub use field::FieldValidator;
pub use format::{KeyFormatter, MessageFormatter, MessageRequest, TemplateFormatter};
pub use messages::{FailedRule, FailureSet, MessageBag};
pub use registry::{BuiltinRule, RegisteredRule, RuleArgs, RuleFn, RuleRegistry};
pub use rule::{Rule, RuleSpec};
pub use rules::exists::ExistenceChecker;
pub use rules::nested::{SubValidator, ValidatorCatalog, ValidatorResolver};
pub use validator::{RuleSet, RuleSetBuilder, Validator, ValidatorBuilder};
