//! Built-in rule evaluators, grouped by category.
//!
//! Every function here has the [`BuiltinRule`](crate::registry::BuiltinRule)
//! signature and is registered by
//! [`RuleRegistry::with_builtins`](crate::RuleRegistry::with_builtins).

pub mod comparison;
pub mod exists;
pub mod nested;
pub mod presence;
pub mod size;
pub mod string;
pub mod types;
