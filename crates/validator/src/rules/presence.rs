//! Presence rules.
//!
//! All of these except the markers are implicit: they run for absent
//! fields and decide based on absence itself.

use serde_json::Value;

use crate::coerce::is_empty_value;
use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;

/// `required`: present and not empty.
pub fn required(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(!is_empty_value(args.value))
}

/// `present`: the key exists, any value including null.
pub fn present(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(args.value.is_some())
}

/// `filled`: may be absent, but not empty when present.
pub fn filled(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(args.value.is_none() || !is_empty_value(args.value))
}

/// `accepted`: `yes`, `on`, `1`, `true` in any of their scalar forms.
pub fn accepted(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(match args.value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_u64() == Some(1),
        Some(Value::String(s)) => matches!(s.as_str(), "yes" | "on" | "1" | "true"),
        _ => false,
    })
}

/// `required_with:a,b`: required when any of the listed fields is filled.
pub fn required_with(
    args: &RuleArgs<'_>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<bool, ConfigError> {
    args.require_param(0)?;
    let triggered = args
        .params()
        .iter()
        .any(|other| !is_empty_value(ctx.value(other)));
    Ok(!triggered || !is_empty_value(args.value))
}

/// `required_without:a,b`: required when any of the listed fields is empty.
pub fn required_without(
    args: &RuleArgs<'_>,
    ctx: &mut EvaluationContext<'_>,
) -> Result<bool, ConfigError> {
    args.require_param(0)?;
    let triggered = args
        .params()
        .iter()
        .any(|other| is_empty_value(ctx.value(other)));
    Ok(!triggered || !is_empty_value(args.value))
}

/// `nullable` and `bail` change how the engine walks a field; on their own
/// they always pass.
pub fn marker(_args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(true)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::Data;
    use crate::rules::test_support::{check, single};

    #[rstest]
    #[case(Some(json!("x")), true)]
    #[case(Some(json!(0)), true)]
    #[case(Some(json!(false)), true)]
    #[case(Some(json!("   ")), false)]
    #[case(Some(json!([])), false)]
    #[case(Some(json!(null)), false)]
    #[case(None, false)]
    fn required_cases(#[case] value: Option<Value>, #[case] expected: bool) {
        assert_eq!(check("required", value), expected);
    }

    #[test]
    fn present_allows_null_but_not_absence() {
        assert!(check("present", Some(json!(null))));
        assert!(!check("present", None));
    }

    #[test]
    fn filled_only_checks_present_values() {
        assert!(check("filled", None));
        assert!(check("filled", Some(json!("x"))));
        assert!(!check("filled", Some(json!(""))));
    }

    #[rstest]
    #[case(json!("yes"), true)]
    #[case(json!("on"), true)]
    #[case(json!(1), true)]
    #[case(json!(true), true)]
    #[case(json!("no"), false)]
    #[case(json!(0), false)]
    fn accepted_cases(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(check("accepted", Some(value)), expected);
    }

    fn with_fields(pairs: &[(&str, Value)]) -> Data {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn required_with_triggers_on_filled_sibling() {
        let validator = single("required_with:g,h");
        assert!(validator.verify(&Data::new()).unwrap());
        assert!(!validator.verify(&with_fields(&[("g", json!("x"))])).unwrap());
        assert!(validator
            .verify(&with_fields(&[("g", json!("x")), ("f", json!("y"))]))
            .unwrap());
    }

    #[test]
    fn required_without_triggers_on_empty_sibling() {
        let validator = single("required_without:g");
        assert!(!validator.verify(&Data::new()).unwrap());
        assert!(validator.verify(&with_fields(&[("g", json!("x"))])).unwrap());
    }

    #[test]
    fn required_with_needs_a_field_list() {
        let err = single("required_with").verify(&Data::new()).unwrap_err();
        assert_eq!(
            err,
            crate::ConfigError::missing_parameter("f", "required_with")
        );
    }
}
