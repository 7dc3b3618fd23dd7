//! Integration tests for `nested:name` composition.

use gatekeep_validator::RegisteredRule;
use gatekeep_validator::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn data(value: Value) -> Data {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn simple() -> Validator {
    Validator::new(
        RuleSet::builder()
            .rule("age", "required|numeric|min:5")
            .rule("size", "numeric|min:10")
            .build()
            .unwrap(),
    )
}

fn nested_validator() -> Validator {
    Validator::new(
        RuleSet::builder()
            .rule("nested", "required|array|nested:simple")
            .validator("simple", simple())
            .build()
            .unwrap(),
    )
}

#[test]
fn accepts_a_valid_child() {
    assert!(nested_validator()
        .verify(&data(json!({"nested": {"age": 10, "size": 15}})))
        .unwrap());
}

#[rstest]
#[case(json!({}))]
#[case(json!({"nested": []}))]
#[case(json!({"nested": {"age": 15, "size": 8}}))]
fn rejects_invalid_children(#[case] input: Value) {
    assert!(!nested_validator().verify(&data(input)).unwrap());
}

#[test]
fn failures_are_spliced_under_the_field() {
    let evaluation = nested_validator()
        .evaluate(&data(json!({"nested": {"age": 1, "size": 2}})))
        .unwrap();

    assert_eq!(
        evaluation.failures().paths().collect::<Vec<_>>(),
        ["nested.age", "nested.size"]
    );
    assert!(!evaluation.failures().contains("nested"));
    assert_eq!(evaluation.messages().get("nested.age").len(), 1);
    assert_eq!(evaluation.messages().get("nested.size").len(), 1);
    assert_eq!(evaluation.messages().count(), 2);
}

#[test]
fn child_messages_keep_their_text() {
    let evaluation = nested_validator()
        .evaluate(&data(json!({"nested": {"age": 1}})))
        .unwrap();
    assert_eq!(
        evaluation.messages().get("nested.age"),
        ["The age must be at least 5."]
    );
}

#[test]
fn non_object_value_is_validated_as_an_empty_object() {
    let parent = Validator::new(
        RuleSet::builder()
            .rule("nested", "present|nested:simple")
            .validator("simple", simple())
            .build()
            .unwrap(),
    );
    let evaluation = parent
        .evaluate(&data(json!({"nested": "not an object"})))
        .unwrap();
    assert!(evaluation.failures().has_rule("nested.age", "required"));
}

#[test]
fn three_levels_compose_paths() {
    let middle = Validator::new(
        RuleSet::builder()
            .rule("inner", "required|nested:simple")
            .validator("simple", simple())
            .build()
            .unwrap(),
    );
    let outer = Validator::new(
        RuleSet::builder()
            .rule("outer", "required|nested:middle")
            .validator("middle", middle)
            .build()
            .unwrap(),
    );

    let evaluation = outer
        .evaluate(&data(json!({"outer": {"inner": {"age": 1}}})))
        .unwrap();
    assert_eq!(
        evaluation.failures().paths().collect::<Vec<_>>(),
        ["outer.inner.age"]
    );
}

#[test]
fn parse_returns_the_original_child_object() {
    let parsed = nested_validator()
        .parse(&data(json!({"nested": {"age": "10", "size": "20"}})))
        .unwrap();
    assert_eq!(
        parsed.get("nested"),
        Some(&json!({"age": "10", "size": "20"}))
    );
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn named_child_is_built_by_the_resolver() {
    let parent = Validator::builder()
        .rules(
            RuleSet::builder()
                .rule("nested", "required|nested:simple")
                .validator_ref("simple", "SimpleValidator")
                .build()
                .unwrap(),
        )
        .resolver(ValidatorCatalog::new().with("SimpleValidator", simple))
        .build();

    assert!(parent
        .verify(&data(json!({"nested": {"age": 10}})))
        .unwrap());
    assert!(!parent
        .verify(&data(json!({"nested": {"age": 1}})))
        .unwrap());
}

#[test]
fn resolver_failure_propagates_as_config_error() {
    let parent = Validator::builder()
        .rules(
            RuleSet::builder()
                .rule("nested", "nested:simple")
                .validator_ref("simple", "Missing")
                .build()
                .unwrap(),
        )
        .resolver(ValidatorCatalog::new())
        .build();

    let err = parent
        .verify(&data(json!({"nested": {}})))
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnresolvableValidator { .. }));
}

#[test]
fn child_config_errors_propagate_unchanged() {
    let broken = Validator::new(RuleSet::builder().rule("age", "isEven").build().unwrap());
    let parent = Validator::new(
        RuleSet::builder()
            .rule("nested", "nested:broken")
            .validator("broken", broken)
            .build()
            .unwrap(),
    );
    let err = parent.verify(&data(json!({"nested": {}}))).unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnknownRule {
            field: "age".to_owned(),
            rule: "isEven".to_owned()
        }
    );
}

// ============================================================================
// RECURSION LIMIT
// ============================================================================

fn tree_resolver(_name: &str) -> Result<Validator, ConfigError> {
    Ok(tree())
}

fn tree() -> Validator {
    Validator::builder()
        .rules(
            RuleSet::builder()
                .rule("child", "nested:tree")
                .validator_ref("tree", "tree")
                .build()
                .unwrap(),
        )
        .resolver(tree_resolver)
        .config(EngineConfig::default().with_max_depth(8))
        .build()
}

fn chain(depth: usize) -> Data {
    let mut value = json!({});
    for _ in 0..depth {
        value = json!({"child": value});
    }
    data(value)
}

#[test]
fn self_referencing_schema_follows_finite_data() {
    assert!(tree().verify(&chain(5)).unwrap());
}

#[test]
fn self_referencing_schema_is_bounded_by_max_depth() {
    let err = tree().verify(&chain(20)).unwrap_err();
    assert_eq!(err, ConfigError::RecursionLimit { max_depth: 8 });
}

// A custom composition rule that walks `child` with its own validator.
fn follow_child(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let child = match args.value {
        Some(Value::Object(map)) => map.clone(),
        _ => Data::new(),
    };
    let parent = ctx.validator();
    let evaluation = ctx.evaluate_child(parent, &child)?;
    if !evaluation.is_valid() {
        ctx.splice(args.field, &evaluation);
    }
    Ok(true)
}

fn custom_tree() -> Validator {
    let mut registry = RuleRegistry::with_builtins();
    registry.register_rule("follow", RegisteredRule::new(follow_child));
    Validator::builder()
        .rules(RuleSet::builder().rule("child", "follow").build().unwrap())
        .registry(registry)
        .config(EngineConfig::default().with_max_depth(8))
        .build()
}

#[test]
fn custom_composition_rule_follows_finite_data() {
    assert!(custom_tree().verify(&chain(5)).unwrap());
}

#[test]
fn custom_composition_rule_is_bounded_by_max_depth() {
    let err = custom_tree().verify(&chain(20)).unwrap_err();
    assert_eq!(err, ConfigError::RecursionLimit { max_depth: 8 });
}
