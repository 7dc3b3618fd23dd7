//! Rule registry.
//!
//! Maps rule names to evaluators. Built-ins are grouped by category the same
//! way they live under [`rules`](crate::rules); callers add their own with
//! [`RuleRegistry::register`] or [`RuleRegistry::register_implicit`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::rule::{Rule, RuleSpec};
use crate::rules::{comparison, exists, nested, presence, size, string, types};

/// Arguments handed to a rule evaluator.
#[derive(Debug, Clone, Copy)]
pub struct RuleArgs<'a> {
    /// Field the rule is declared on.
    pub field: &'a str,
    /// The rule being evaluated.
    pub rule: &'a Rule,
    /// Current working value, `None` when the field is absent.
    pub value: Option<&'a Value>,
    /// Every rule declared on the field.
    pub spec: &'a RuleSpec,
}

impl<'a> RuleArgs<'a> {
    /// Rule parameters.
    pub fn params(&self) -> &'a [String] {
        self.rule.params()
    }

    /// Parameter at `index`, if declared.
    pub fn param(&self, index: usize) -> Option<&'a str> {
        self.rule.param(index)
    }

    /// Parameter at `index`, or a [`ConfigError::MissingParameter`].
    pub fn require_param(&self, index: usize) -> Result<&'a str, ConfigError> {
        self.param(index)
            .ok_or_else(|| ConfigError::missing_parameter(self.field, self.rule.name()))
    }

    /// Parameter at `index` parsed as a number.
    pub fn number_param(&self, index: usize) -> Result<f64, ConfigError> {
        let raw = self.require_param(index)?;
        raw.trim()
            .parse()
            .map_err(|_| ConfigError::invalid_parameter(self.field, self.rule.name(), raw))
    }

    /// `true` if the field carries a numeric type rule.
    pub fn is_numeric_field(&self) -> bool {
        self.spec.has("numeric") || self.spec.has("integer")
    }
}

/// Signature of a built-in rule.
pub type BuiltinRule =
    fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> Result<bool, ConfigError>;

/// Shared rule evaluator.
pub type RuleFn =
    Arc<dyn Fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> Result<bool, ConfigError> + Send + Sync>;

/// An evaluator plus its implicit flag.
///
/// Implicit rules run even when the field is absent from the data.
#[derive(Clone)]
pub struct RegisteredRule {
    evaluator: RuleFn,
    implicit: bool,
}

impl RegisteredRule {
    /// Wraps an evaluator as a regular rule.
    pub fn new<F>(evaluator: F) -> Self
    where
        F: Fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> Result<bool, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            evaluator: Arc::new(evaluator),
            implicit: false,
        }
    }

    /// Marks the rule as implicit.
    #[must_use = "builder methods must be chained or built"]
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// `true` if the rule runs for absent fields.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    /// Runs the evaluator.
    pub fn evaluate(
        &self,
        args: &RuleArgs<'_>,
        ctx: &mut EvaluationContext<'_>,
    ) -> Result<bool, ConfigError> {
        (self.evaluator)(args, ctx)
    }
}

impl fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("evaluator", &"<function>")
            .field("implicit", &self.implicit)
            .finish()
    }
}

/// Registry of rule evaluators keyed by name.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, RegisteredRule>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in rule.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_presence_rules();
        registry.register_type_rules();
        registry.register_size_rules();
        registry.register_string_rules();
        registry.register_comparison_rules();
        registry.register_exists_rule();
        registry.register_composition_rules();

        registry
    }

    /// Registers a custom rule that reports pass or fail.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatekeep_validator::RuleRegistry;
    ///
    /// let mut registry = RuleRegistry::with_builtins();
    /// registry.register("isOdd", |args, _ctx| {
    ///     args.value
    ///         .and_then(serde_json::Value::as_i64)
    ///         .is_some_and(|n| n % 2 == 1)
    /// });
    /// assert!(registry.contains("isOdd"));
    /// ```
    pub fn register<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_rule(name, RegisteredRule::new(move |args, ctx| Ok(rule(args, ctx))));
    }

    /// Registers a custom rule that also runs for absent fields.
    pub fn register_implicit<F>(&mut self, name: impl Into<String>, rule: F)
    where
        F: Fn(&RuleArgs<'_>, &mut EvaluationContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.register_rule(
            name,
            RegisteredRule::new(move |args, ctx| Ok(rule(args, ctx))).implicit(),
        );
    }

    /// Registers a fully specified rule, replacing any previous one.
    pub fn register_rule(&mut self, name: impl Into<String>, rule: RegisteredRule) {
        self.rules.insert(name.into(), rule);
    }

    /// Looks up a rule.
    pub fn get(&self, name: &str) -> Option<&RegisteredRule> {
        self.rules.get(name)
    }

    /// Looks up a rule declared on `field`, failing for unknown names.
    pub fn resolve(&self, field: &str, name: &str) -> Result<&RegisteredRule, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::unknown_rule(field, name))
    }

    /// `true` if the named rule runs for absent fields.
    pub fn is_implicit(&self, name: &str) -> bool {
        self.get(name).is_some_and(RegisteredRule::is_implicit)
    }

    /// `true` if a rule with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn builtin(&mut self, name: &str, rule: BuiltinRule) {
        self.register_rule(name, RegisteredRule::new(rule));
    }

    fn builtin_implicit(&mut self, name: &str, rule: BuiltinRule) {
        self.register_rule(name, RegisteredRule::new(rule).implicit());
    }

    // Registration methods for each category

    fn register_presence_rules(&mut self) {
        self.builtin_implicit("required", presence::required);
        self.builtin_implicit("present", presence::present);
        self.builtin_implicit("filled", presence::filled);
        self.builtin_implicit("accepted", presence::accepted);
        self.builtin_implicit("required_with", presence::required_with);
        self.builtin_implicit("required_without", presence::required_without);
        self.builtin("nullable", presence::marker);
        self.builtin("bail", presence::marker);
    }

    fn register_type_rules(&mut self) {
        self.builtin_implicit("boolean", types::boolean);
        self.builtin_implicit("integer", types::integer);
        self.builtin_implicit("numeric", types::numeric);
        self.builtin_implicit("string", types::string);
        self.builtin_implicit("array", types::array);
    }

    fn register_size_rules(&mut self) {
        self.builtin("min", size::min);
        self.builtin("max", size::max);
        self.builtin("between", size::between);
        self.builtin("size", size::size);
        self.builtin("digits", size::digits);
    }

    fn register_string_rules(&mut self) {
        self.builtin("regex", string::regex);
        self.builtin("not_regex", string::not_regex);
        self.builtin("email", string::email);
        self.builtin("alpha", string::alpha);
        self.builtin("alpha_num", string::alpha_num);
        self.builtin("alpha_dash", string::alpha_dash);
    }

    fn register_comparison_rules(&mut self) {
        self.builtin("in", comparison::in_list);
        self.builtin("not_in", comparison::not_in_list);
        self.builtin("same", comparison::same);
        self.builtin("different", comparison::different);
    }

    fn register_exists_rule(&mut self) {
        self.builtin("exists", exists::exists);
    }

    fn register_composition_rules(&mut self) {
        self.builtin("nested", nested::nested);
        self.builtin("nested_collection", nested::nested_collection);
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}
