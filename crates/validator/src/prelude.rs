//! Prelude module for convenient imports.
//!
//! `use gatekeep_validator::prelude::*;` brings in the types needed to
//! declare rule sets, build validators and inspect their results.

pub use crate::Data;
pub use crate::config::EngineConfig;
pub use crate::context::{Evaluation, EvaluationContext};
pub use crate::error::{ConfigError, Error, ValidationFailure};
pub use crate::field::FieldValidator;
pub use crate::format::{MessageFormatter, MessageRequest, TemplateFormatter};
pub use crate::messages::{FailureSet, MessageBag};
pub use crate::registry::{RuleArgs, RuleRegistry};
pub use crate::rule::RuleSpec;
pub use crate::rules::exists::ExistenceChecker;
pub use crate::rules::nested::{ValidatorCatalog, ValidatorResolver};
pub use crate::validator::{RuleSet, Validator};
