//! Size rules: `min`, `max`, `between`, `size`, `digits`.
//!
//! Numbers measure as themselves when the field also carries `numeric` or
//! `integer`; see [`value_size`](crate::coerce::value_size) for the rest.

use serde_json::Value;

use crate::coerce::value_size;
use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;

fn measure(args: &RuleArgs<'_>) -> Option<f64> {
    args.value
        .map(|value| value_size(value, args.is_numeric_field()))
}

/// `min:n`
pub fn min(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let bound = args.number_param(0)?;
    Ok(measure(args).is_some_and(|size| size >= bound))
}

/// `max:n`
pub fn max(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let bound = args.number_param(0)?;
    Ok(measure(args).is_some_and(|size| size <= bound))
}

/// `between:a,b`, inclusive.
pub fn between(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let low = args.number_param(0)?;
    let high = args.number_param(1)?;
    Ok(measure(args).is_some_and(|size| size >= low && size <= high))
}

/// `size:n`, exact.
pub fn size(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let expected = args.number_param(0)?;
    Ok(measure(args).is_some_and(|size| (size - expected).abs() < f64::EPSILON))
}

/// `digits:n`: exactly `n` decimal digits and nothing else.
pub fn digits(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let raw = args.require_param(0)?;
    let expected: usize = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_parameter(args.field, args.rule.name(), raw))?;

    let text = match args.value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.is_u64() => n.to_string(),
        _ => return Ok(false),
    };
    Ok(text.len() == expected && text.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::ConfigError;
    use crate::rules::test_support::{check, single};

    #[rstest]
    #[case("numeric|min:5", json!(10), true)]
    #[case("numeric|min:5", json!("5"), true)]
    #[case("numeric|min:5", json!(3), false)]
    #[case("min:5", json!("hello"), true)]
    #[case("min:5", json!("hi"), false)]
    #[case("min:2", json!([1, 2]), true)]
    #[case("max:3", json!("abcd"), false)]
    #[case("integer|max:3", json!(3), true)]
    #[case("between:2,4", json!("abc"), true)]
    #[case("numeric|between:2,4", json!(5), false)]
    #[case("size:5", json!("test2"), true)]
    #[case("size:5", json!("test"), false)]
    #[case("numeric|size:1.5", json!("1.5"), true)]
    fn size_rules(#[case] spec: &str, #[case] value: Value, #[case] expected: bool) {
        assert_eq!(check(spec, Some(value)), expected, "{spec}");
    }

    #[rstest]
    #[case(json!("1234"), true)]
    #[case(json!(1234), true)]
    #[case(json!("123"), false)]
    #[case(json!("12a4"), false)]
    #[case(json!(-123), false)]
    fn digits_rule(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(check("digits:4", Some(value)), expected);
    }

    #[test]
    fn non_numeric_bound_is_a_config_error() {
        let mut data = crate::Data::new();
        data.insert("f".to_owned(), json!(3));
        let err = single("min:lots").verify(&data).unwrap_err();
        assert_eq!(err, ConfigError::invalid_parameter("f", "min", "lots"));
    }
}
