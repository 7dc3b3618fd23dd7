//! Rule sets and the evaluation engine.
//!
//! A [`RuleSet`] is the immutable schema: field name to [`RuleSpec`], plus
//! message overrides and the sub-validators that composition rules refer
//! to. A [`Validator`] pairs a rule set with the collaborators needed to
//! run it (rule registry, message formatter, resolver, existence checker)
//! and is cheap to clone and safe to share across threads. Every call gets
//! its own [`EvaluationContext`].
//!
//! # Examples
//!
//! ```
//! use gatekeep_validator::{RuleSet, Validator};
//! use serde_json::json;
//!
//! let rules = RuleSet::builder()
//!     .rule("age", "required|numeric|min:5")
//!     .rule("size", "numeric|min:10")
//!     .build()
//!     .unwrap();
//! let validator = Validator::new(rules);
//!
//! let data = json!({"age": "10", "size": "20", "extra": 1});
//! let parsed = validator.parse(data.as_object().unwrap()).unwrap();
//! assert_eq!(serde_json::Value::Object(parsed), json!({"age": 10, "size": 20}));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use tracing::{debug, trace, warn};

use crate::Data;
use crate::config::EngineConfig;
use crate::context::{Evaluation, EvaluationContext};
use crate::error::{ConfigError, Error, Result};
use crate::format::{MessageFormatter, MessageRequest, TemplateFormatter};
use crate::registry::{RegisteredRule, RuleArgs, RuleRegistry};
use crate::rule::{Rule, RuleSpec};
use crate::rules::exists::ExistenceChecker;
use crate::rules::nested::{SubValidator, ValidatorResolver};
use crate::rules::string::compile_pattern;

const COMPOSITION_RULES: &[&str] = &["nested", "nested_collection"];

// ============================================================================
// RULE SET
// ============================================================================

/// Immutable schema: per-field rules, message overrides and sub-validators.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: IndexMap<String, RuleSpec>,
    messages: HashMap<String, String>,
    validators: IndexMap<String, SubValidator>,
    patterns: HashMap<String, Regex>,
}

impl RuleSet {
    /// Starts building a rule set.
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    /// Declared fields with their rules, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.fields.iter().map(|(field, spec)| (field.as_str(), spec))
    }

    /// Rules declared for `field`.
    pub fn spec(&self, field: &str) -> Option<&RuleSpec> {
        self.fields.get(field)
    }

    /// `true` if `field` is declared.
    pub fn declares(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Message override for a failure: `"field.rule"` first, then `"rule"`.
    pub fn message_override(&self, field: &str, rule: &str) -> Option<&str> {
        self.messages
            .get(&format!("{field}.{rule}"))
            .or_else(|| self.messages.get(rule))
            .map(String::as_str)
    }

    /// Sub-validator registered under `name`.
    pub fn sub_validator(&self, name: &str) -> Option<&SubValidator> {
        self.validators.get(name)
    }

    /// Precompiled pattern for a `regex` / `not_regex` parameter.
    pub fn pattern(&self, raw: &str) -> Option<&Regex> {
        self.patterns.get(raw)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One-field rule set sharing this set's messages and sub-validators.
    pub(crate) fn with_single_field(
        &self,
        field: &str,
        spec: RuleSpec,
    ) -> std::result::Result<Self, ConfigError> {
        let mut builder = RuleSetBuilder {
            fields: IndexMap::new(),
            messages: self.messages.clone(),
            validators: self.validators.clone(),
        };
        builder.fields.insert(field.to_owned(), spec);
        builder.build()
    }
}

/// Builder for [`RuleSet`].
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    fields: IndexMap<String, RuleSpec>,
    messages: HashMap<String, String>,
    validators: IndexMap<String, SubValidator>,
}

impl RuleSetBuilder {
    /// Declares the rules for `field`, replacing earlier ones.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, field: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.fields.insert(field.into(), spec.into());
        self
    }

    /// Adds a message override keyed `"field.rule"` or `"rule"`.
    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.messages.insert(key.into(), template.into());
        self
    }

    /// Registers a ready validator instance for composition rules.
    #[must_use = "builder methods must be chained or built"]
    pub fn validator(mut self, name: impl Into<String>, validator: Validator) -> Self {
        self.validators
            .insert(name.into(), SubValidator::Instance(Arc::new(validator)));
        self
    }

    /// Registers a name the validator's resolver turns into an instance.
    #[must_use = "builder methods must be chained or built"]
    pub fn validator_ref(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.validators
            .insert(name.into(), SubValidator::Named(target.into()));
        self
    }

    /// Checks field names and composition parameters and compiles patterns.
    pub fn build(self) -> std::result::Result<RuleSet, ConfigError> {
        let mut patterns: HashMap<String, Regex> = HashMap::new();

        for (field, spec) in &self.fields {
            if field.is_empty() {
                return Err(ConfigError::EmptyField);
            }
            if field.contains('.') {
                return Err(ConfigError::DottedField {
                    field: field.clone(),
                });
            }

            for rule in spec {
                if COMPOSITION_RULES.contains(&rule.name()) && rule.param(0).is_none() {
                    return Err(ConfigError::missing_parameter(field.as_str(), rule.name()));
                }
                if matches!(rule.name(), "regex" | "not_regex") {
                    let Some(raw) = rule.param(0) else {
                        return Err(ConfigError::missing_parameter(field.as_str(), rule.name()));
                    };
                    if !patterns.contains_key(raw) {
                        let regex = compile_pattern(raw).map_err(|err| {
                            ConfigError::InvalidPattern {
                                field: field.clone(),
                                pattern: raw.to_owned(),
                                reason: err.to_string(),
                            }
                        })?;
                        patterns.insert(raw.to_owned(), regex);
                    }
                }
            }
        }

        Ok(RuleSet {
            fields: self.fields,
            messages: self.messages,
            validators: self.validators,
            patterns,
        })
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// A rule set bound to the collaborators that evaluate it.
#[derive(Clone)]
pub struct Validator {
    rules: Arc<RuleSet>,
    registry: Arc<RuleRegistry>,
    formatter: Arc<dyn MessageFormatter>,
    resolver: Option<Arc<dyn ValidatorResolver>>,
    existence: Option<Arc<dyn ExistenceChecker>>,
    config: EngineConfig,
}

impl Validator {
    /// Creates a validator with the built-in rules and English messages.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
            registry: Arc::new(RuleRegistry::with_builtins()),
            formatter: Arc::new(TemplateFormatter::new()),
            resolver: None,
            existence: None,
            config: EngineConfig::default(),
        }
    }

    /// Starts building a validator.
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// The schema.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The rule registry.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolver for named sub-validators.
    pub fn resolver(&self) -> Option<&dyn ValidatorResolver> {
        self.resolver.as_deref()
    }

    /// Checker used by the `exists` rule.
    pub fn existence_checker(&self) -> Option<&dyn ExistenceChecker> {
        self.existence.as_deref()
    }

    /// Same collaborators, different rules.
    pub fn with_rules(&self, rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
            ..self.clone()
        }
    }

    /// Runs every declared field's rules against a working copy of `data`.
    ///
    /// Data failures are reported through the returned [`Evaluation`];
    /// only configuration defects are errors.
    pub fn evaluate(&self, data: &Data) -> std::result::Result<Evaluation, ConfigError> {
        self.evaluate_at_depth(data, 0)
    }

    /// `true` if `data` satisfies every rule.
    pub fn verify(&self, data: &Data) -> std::result::Result<bool, ConfigError> {
        Ok(self.evaluate(data)?.is_valid())
    }

    /// Validates `data` and returns its coerced, declared-fields-only form.
    ///
    /// Undeclared fields are dropped. A failed validation surfaces as
    /// [`Error::Validation`] carrying every failure and message.
    pub fn parse(&self, data: &Data) -> Result<Data> {
        let evaluation = self.evaluate(data)?;
        if !evaluation.is_valid() {
            return Err(Error::Validation(evaluation.into_failure()));
        }
        let mut parsed = evaluation.into_data();
        parsed.retain(|field, _| self.rules.declares(field));
        Ok(parsed)
    }

    pub(crate) fn evaluate_at_depth(
        &self,
        data: &Data,
        depth: usize,
    ) -> std::result::Result<Evaluation, ConfigError> {
        if depth > self.config.max_depth {
            warn!(
                depth,
                max_depth = self.config.max_depth,
                "nested validation aborted"
            );
            return Err(ConfigError::RecursionLimit {
                max_depth: self.config.max_depth,
            });
        }

        let mut ctx = EvaluationContext::new(self, data.clone(), depth);
        for (field, spec) in self.rules.fields() {
            self.evaluate_field(field, spec, &mut ctx)?;
        }

        let evaluation = ctx.into_evaluation();
        debug!(
            fields = self.rules.len(),
            failures = evaluation.failures().len(),
            depth,
            "evaluation finished"
        );
        Ok(evaluation)
    }

    fn evaluate_field(
        &self,
        field: &str,
        spec: &RuleSpec,
        ctx: &mut EvaluationContext<'_>,
    ) -> std::result::Result<(), ConfigError> {
        let bail = self.config.bail || spec.has("bail");
        let nullable = spec.has("nullable");

        for rule in spec {
            let registered = self.registry.resolve(field, rule.name())?;
            let value = ctx.value(field).cloned();
            if !should_run(registered, value.as_ref(), nullable) {
                continue;
            }

            let args = RuleArgs {
                field,
                rule,
                value: value.as_ref(),
                spec,
            };
            let passed = registered.evaluate(&args, ctx)?;
            trace!(field, rule = rule.name(), passed, "rule evaluated");

            if !passed {
                ctx.record_failure(field, rule);
                if bail {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Renders the message for `rule` failing on `field`.
    pub(crate) fn render_message(&self, field: &str, rule: &Rule) -> String {
        self.formatter.render(&MessageRequest {
            field,
            rule: rule.name(),
            params: rule.params(),
            template: self.rules.message_override(field, rule.name()),
        })
    }
}

/// Implicit rules always run. Others need the field present, and skip a
/// null value when the field is `nullable`.
fn should_run(rule: &RegisteredRule, value: Option<&serde_json::Value>, nullable: bool) -> bool {
    if rule.is_implicit() {
        return true;
    }
    match value {
        None => false,
        Some(serde_json::Value::Null) => !nullable,
        Some(_) => true,
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.rules)
            .field("formatter", &"<formatter>")
            .field("resolver", &self.resolver.is_some())
            .field("existence", &self.existence.is_some())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// VALIDATOR BUILDER
// ============================================================================

/// Builder for [`Validator`].
#[derive(Default)]
pub struct ValidatorBuilder {
    rules: RuleSet,
    registry: Option<RuleRegistry>,
    formatter: Option<Arc<dyn MessageFormatter>>,
    resolver: Option<Arc<dyn ValidatorResolver>>,
    existence: Option<Arc<dyn ExistenceChecker>>,
    config: EngineConfig,
}

impl ValidatorBuilder {
    /// Sets the schema.
    #[must_use = "builder methods must be chained or built"]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Replaces the rule registry (defaults to the built-ins).
    #[must_use = "builder methods must be chained or built"]
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Adds a custom rule on top of the current registry.
    #[must_use = "builder methods must be chained or built"]
    pub fn custom_rule<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.registry
            .get_or_insert_with(RuleRegistry::with_builtins)
            .register(name, rule);
        self
    }

    /// Adds a custom rule that also runs for absent fields.
    #[must_use = "builder methods must be chained or built"]
    pub fn implicit_rule<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.registry
            .get_or_insert_with(RuleRegistry::with_builtins)
            .register_implicit(name, rule);
        self
    }

    /// Sets the message formatter.
    #[must_use = "builder methods must be chained or built"]
    pub fn formatter(mut self, formatter: impl MessageFormatter + 'static) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Sets the resolver for names registered with
    /// [`RuleSetBuilder::validator_ref`].
    #[must_use = "builder methods must be chained or built"]
    pub fn resolver(mut self, resolver: impl ValidatorResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Sets a shared resolver.
    #[must_use = "builder methods must be chained or built"]
    pub fn shared_resolver(mut self, resolver: Arc<dyn ValidatorResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the checker used by the `exists` rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn existence_checker(mut self, checker: impl ExistenceChecker + 'static) -> Self {
        self.existence = Some(Arc::new(checker));
        self
    }

    /// Sets the engine configuration.
    #[must_use = "builder methods must be chained or built"]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the validator.
    pub fn build(self) -> Validator {
        Validator {
            rules: Arc::new(self.rules),
            registry: Arc::new(self.registry.unwrap_or_else(RuleRegistry::with_builtins)),
            formatter: self
                .formatter
                .unwrap_or_else(|| Arc::new(TemplateFormatter::new())),
            resolver: self.resolver,
            existence: self.existence,
            config: self.config,
        }
    }
}

impl fmt::Debug for ValidatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBuilder")
            .field("rules", &self.rules)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
