//! Composition rules: `nested:name` and `nested_collection:name`.
//!
//! Both delegate part of the input to another [`Validator`] and splice its
//! failures back under a dotted prefix (`field.sub` or `field.i.sub`). The
//! rule itself always passes; only the spliced failures make the parent
//! invalid. Configuration errors from the child propagate unchanged.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::Data;
use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;
use crate::validator::Validator;

// ============================================================================
// SUB-VALIDATORS
// ============================================================================

/// A sub-validator registered on a rule set.
#[derive(Debug, Clone)]
pub enum SubValidator {
    /// A ready instance, shared by every evaluation.
    Instance(Arc<Validator>),
    /// A name handed to the parent validator's [`ValidatorResolver`].
    Named(String),
}

/// Turns a registered name into a validator instance.
pub trait ValidatorResolver: Send + Sync {
    /// Builds the validator registered as `name`.
    fn resolve(&self, name: &str) -> Result<Validator, ConfigError>;
}

impl<F> ValidatorResolver for F
where
    F: Fn(&str) -> Result<Validator, ConfigError> + Send + Sync,
{
    fn resolve(&self, name: &str) -> Result<Validator, ConfigError> {
        self(name)
    }
}

type Factory = Arc<dyn Fn() -> Validator + Send + Sync>;

/// Resolver backed by named factories.
///
/// Every [`resolve`](ValidatorResolver::resolve) builds a fresh instance.
///
/// # Examples
///
/// ```
/// use gatekeep_validator::{RuleSet, Validator, ValidatorCatalog, ValidatorResolver};
///
/// let catalog = ValidatorCatalog::new().with("simple", || {
///     Validator::new(RuleSet::builder().rule("age", "required").build().unwrap())
/// });
/// assert!(catalog.resolve("simple").is_ok());
/// assert!(catalog.resolve("missing").is_err());
/// ```
#[derive(Clone, Default)]
pub struct ValidatorCatalog {
    factories: HashMap<String, Factory>,
}

impl ValidatorCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Validator + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use = "builder methods must be chained or built"]
    pub fn with<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Validator + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// `true` if a factory is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl ValidatorResolver for ValidatorCatalog {
    fn resolve(&self, name: &str) -> Result<Validator, ConfigError> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ConfigError::unresolvable_validator(name, "no factory is registered"))
    }
}

impl fmt::Debug for ValidatorCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ValidatorCatalog")
            .field("factories", &names)
            .finish()
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

fn lookup<'v>(parent: &'v Validator, name: &str) -> Result<&'v SubValidator, ConfigError> {
    parent
        .rules()
        .sub_validator(name)
        .ok_or_else(|| ConfigError::unknown_validator(name))
}

fn instantiate(
    parent: &Validator,
    rule: &str,
    sub: &SubValidator,
) -> Result<Arc<Validator>, ConfigError> {
    match sub {
        SubValidator::Instance(validator) => Ok(Arc::clone(validator)),
        SubValidator::Named(target) => {
            let resolver = parent
                .resolver()
                .ok_or_else(|| ConfigError::missing_collaborator(rule, "validator resolver"))?;
            resolver.resolve(target).map(Arc::new)
        }
    }
}

/// Objects are validated as-is; anything else as an empty object.
fn child_data(value: Option<&Value>) -> Data {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Data::new(),
    }
}

// ============================================================================
// RULES
// ============================================================================

/// `nested:name`: validates the field's object with another validator.
pub fn nested(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let name = args.require_param(0)?;
    let parent = ctx.validator();
    let child = instantiate(parent, args.rule.name(), lookup(parent, name)?)?;

    let evaluation = ctx.evaluate_child(&child, &child_data(args.value))?;
    if !evaluation.is_valid() {
        ctx.splice(args.field, &evaluation);
    }
    Ok(true)
}

/// `nested_collection:name`: validates every element with another validator.
///
/// Arrays are walked in order; objects by their values in key order.
/// Named sub-validators are resolved again after each failing element.
pub fn nested_collection(
    args: &RuleArgs<'_>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<bool, ConfigError> {
    let name = args.require_param(0)?;
    let parent = ctx.validator();
    let sub = lookup(parent, name)?;
    let mut child = instantiate(parent, args.rule.name(), sub)?;

    let items: Vec<&Value> = match args.value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    };

    for (index, item) in items.into_iter().enumerate() {
        let evaluation = ctx.evaluate_child(&child, &child_data(Some(item)))?;
        if evaluation.is_valid() {
            continue;
        }
        ctx.splice(&format!("{}.{index}", args.field), &evaluation);
        if matches!(sub, SubValidator::Named(_)) {
            child = instantiate(parent, args.rule.name(), sub)?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::validator::RuleSet;

    fn simple() -> Validator {
        Validator::new(
            RuleSet::builder()
                .rule("age", "required|numeric|min:5")
                .rule("size", "numeric|min:10")
                .build()
                .unwrap(),
        )
    }

    fn object(value: Value) -> Data {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn nested_rule_itself_never_fails() {
        let parent = Validator::new(
            RuleSet::builder()
                .rule("nested", "nested:simple")
                .validator("simple", simple())
                .build()
                .unwrap(),
        );
        let evaluation = parent
            .evaluate(&object(json!({"nested": {"age": 1}})))
            .unwrap();
        assert!(!evaluation.failures().contains("nested"));
        assert!(evaluation.failures().has_rule("nested.age", "min"));
    }

    #[test]
    fn unregistered_name_is_unknown_validator() {
        let parent = Validator::new(
            RuleSet::builder()
                .rule("nested", "nested:ghost")
                .build()
                .unwrap(),
        );
        let err = parent
            .verify(&object(json!({"nested": {}})))
            .unwrap_err();
        assert_eq!(err, ConfigError::unknown_validator("ghost"));
    }

    #[test]
    fn named_reference_without_resolver_is_missing_collaborator() {
        let parent = Validator::new(
            RuleSet::builder()
                .rule("nested", "nested:simple")
                .validator_ref("simple", "simple")
                .build()
                .unwrap(),
        );
        let err = parent
            .verify(&object(json!({"nested": {}})))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::missing_collaborator("nested", "validator resolver")
        );
    }

    #[test]
    fn named_sub_validator_is_rebuilt_after_failing_elements() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        let catalog = ValidatorCatalog::new().with("simple", || {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            simple()
        });
        let parent = Validator::builder()
            .rules(
                RuleSet::builder()
                    .rule("items", "nested_collection:simple")
                    .validator_ref("simple", "simple")
                    .build()
                    .unwrap(),
            )
            .resolver(catalog)
            .build();

        let data = object(json!({"items": [{"age": 1}, {"age": 10}, {"age": 2}]}));
        let evaluation = parent.evaluate(&data).unwrap();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 3);
        assert_eq!(
            evaluation.failures().paths().collect::<Vec<_>>(),
            ["items.0.age", "items.2.age"]
        );
    }

    #[test]
    fn catalog_reports_unknown_names() {
        let err = ValidatorCatalog::new().resolve("nope").unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvableValidator { .. }));
    }
}
