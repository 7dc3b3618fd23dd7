//! Type predicates and canonicalization for the primitive rules.
//!
//! Every `to_*` function returns `Some(canonical)` when the value belongs to
//! the type and `None` otherwise. The caller decides whether to write the
//! canonical form back into the working data.

use serde_json::{Number, Value};

/// `2^63`, the first float past the `i64` range.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

// ============================================================================
// BOOLEAN
// ============================================================================

/// Canonical boolean for `true`, `false`, `0`, `1`, `"0"` and `"1"`.
pub fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "0" => Some(false),
            "1" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

// ============================================================================
// INTEGER
// ============================================================================

/// Canonical integer value.
///
/// Accepts integral numbers, floats with no fractional part, and decimal
/// strings with an optional sign and no leading zeros (surrounding
/// whitespace is ignored). Booleans are rejected.
pub fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::Number(n) => {
            let f = n.as_f64()?;
            let in_range = (-I64_UPPER_BOUND..I64_UPPER_BOUND).contains(&f);
            if f.is_finite() && f.fract() == 0.0 && in_range {
                Some(Value::from(f as i64))
            } else {
                None
            }
        }
        Value::String(s) => parse_decimal_integer(s.trim()).map(Value::from),
        _ => None,
    }
}

fn parse_decimal_integer(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

// ============================================================================
// NUMERIC
// ============================================================================

/// Parses the broad numeric-string grammar.
///
/// Recognized forms, each with an optional leading sign:
///
/// - decimal integers: `42`, `-7`
/// - hexadecimal: `0x539`
/// - binary: `0b10100111001`
/// - octal (leading zero, octal digits only): `02471`
/// - decimal fractions and exponents: `9.1`, `.5`, `1337e0`, `1e-3`
///
/// Integers that overflow `i64` fall back to a float, in every radix. Fractions and
/// exponents always produce a float. `inf` and `nan` are rejected.
pub fn parse_numeric(input: &str) -> Option<Number> {
    let s = input.trim();
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    if body.is_empty() {
        return None;
    }

    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        return parse_radix(hex, 16, negative);
    }
    if let Some(bin) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        return parse_radix(bin, 2, negative);
    }

    if body.contains(['.', 'e', 'E']) {
        if !is_decimal_float(body) {
            return None;
        }
        let f: f64 = s.parse().ok()?;
        return Number::from_f64(f);
    }

    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if body.len() > 1 && body.starts_with('0') && body.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return parse_radix(&body[1..], 8, negative);
    }

    match s.parse::<i64>() {
        Ok(i) => Some(Number::from(i)),
        Err(_) => s.parse::<f64>().ok().and_then(Number::from_f64),
    }
}

fn parse_radix(digits: &str, radix: u32, negative: bool) -> Option<Number> {
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }
    if let Ok(magnitude) = i64::from_str_radix(digits, radix) {
        return Some(Number::from(if negative { -magnitude } else { magnitude }));
    }

    let magnitude = digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix)
            .map(|digit| acc.mul_add(f64::from(radix), f64::from(digit)))
    })?;
    Number::from_f64(if negative { -magnitude } else { magnitude })
}

/// `digits* ('.' digits*)? ([eE] [+-]? digits+)?` with at least one mantissa digit.
fn is_decimal_float(body: &str) -> bool {
    let bytes = body.as_bytes();
    let mut i = 0;
    let mut mantissa_digits = 0;

    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        mantissa_digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            mantissa_digits += 1;
        }
    }
    if mantissa_digits == 0 {
        return false;
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == bytes.len()
}

/// Canonical numeric value: numbers pass through, strings go through
/// [`parse_numeric`].
pub fn to_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => parse_numeric(s).map(Value::Number),
        _ => None,
    }
}

// ============================================================================
// STRING / ARRAY
// ============================================================================

/// Check if a value is accepted by the `string` rule
#[inline]
pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// Check if a value is accepted by the `array` rule (lists and maps)
#[inline]
pub fn is_array(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

// ============================================================================
// SIZE / EMPTINESS
// ============================================================================

/// Size of a value as measured by `min`, `max`, `between` and `size`.
///
/// With `numeric` set, numeric values measure as their number. Otherwise
/// arrays and maps measure their element count and everything else the
/// character count of its string form.
pub fn value_size(value: &Value, numeric: bool) -> f64 {
    if numeric {
        if let Some(Value::Number(n)) = to_numeric(value) {
            return n.as_f64().unwrap_or(0.0);
        }
    }
    match value {
        Value::Array(items) => items.len() as f64,
        Value::Object(map) => map.len() as f64,
        Value::String(s) => s.chars().count() as f64,
        Value::Number(n) => n.to_string().chars().count() as f64,
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null => 0.0,
    }
}

/// Absent, null, whitespace-only strings and empty collections are empty.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// String form of a scalar used when comparing against rule parameters.
///
/// Returns `None` for null and collections.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(true) => Some("1".to_owned()),
        Value::Bool(false) => Some(String::new()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn boolean_accepts_the_six_canonical_forms() {
        assert_eq!(to_boolean(&json!(true)), Some(true));
        assert_eq!(to_boolean(&json!(false)), Some(false));
        assert_eq!(to_boolean(&json!(1)), Some(true));
        assert_eq!(to_boolean(&json!(0)), Some(false));
        assert_eq!(to_boolean(&json!("1")), Some(true));
        assert_eq!(to_boolean(&json!("0")), Some(false));
    }

    #[test]
    fn boolean_rejects_everything_else() {
        for value in [json!("12"), json!(2), json!("true"), json!(null), json!([])] {
            assert_eq!(to_boolean(&value), None, "{value} should not be boolean");
        }
    }

    #[test]
    fn integer_canonicalizes_strings_and_whole_floats() {
        assert_eq!(to_integer(&json!("13")), Some(json!(13)));
        assert_eq!(to_integer(&json!(" -13 ")), Some(json!(-13)));
        assert_eq!(to_integer(&json!(13)), Some(json!(13)));
        assert_eq!(to_integer(&json!(13.0)), Some(json!(13)));
    }

    #[test]
    fn integer_float_bounds_stop_short_of_two_to_the_63() {
        assert_eq!(to_integer(&json!(9_223_372_036_854_775_808.0_f64)), None);
        assert_eq!(
            to_integer(&json!(-9_223_372_036_854_775_808.0_f64)),
            Some(json!(i64::MIN))
        );
        assert_eq!(
            to_integer(&json!(9_223_372_036_854_774_784.0_f64)),
            Some(json!(9_223_372_036_854_774_784_i64))
        );
        assert_eq!(to_integer(&json!(1e19)), None);
    }

    #[test]
    fn integer_rejects_non_integral_input() {
        for value in [
            json!("string"),
            json!("013"),
            json!("1.5"),
            json!(1.5),
            json!(true),
            json!(""),
            json!("-"),
        ] {
            assert_eq!(to_integer(&value), None, "{value} should not be integer");
        }
    }

    #[test]
    fn numeric_grammar() {
        assert_eq!(parse_numeric("42"), Some(Number::from(42)));
        assert_eq!(parse_numeric("0x539"), Some(Number::from(1337)));
        assert_eq!(parse_numeric("0b10100111001"), Some(Number::from(1337)));
        assert_eq!(parse_numeric("02471"), Some(Number::from(1337)));
        assert_eq!(parse_numeric("-0x10"), Some(Number::from(-16)));
        assert_eq!(parse_numeric("1337e0").and_then(|n| n.as_f64()), Some(1337.0));
        assert_eq!(parse_numeric("9.1").and_then(|n| n.as_f64()), Some(9.1));
        assert_eq!(parse_numeric(".5").and_then(|n| n.as_f64()), Some(0.5));
        assert_eq!(parse_numeric(" 7 "), Some(Number::from(7)));
        assert_eq!(parse_numeric("0"), Some(Number::from(0)));
        assert_eq!(parse_numeric("089"), Some(Number::from(89)));
    }

    #[test]
    fn numeric_grammar_rejections() {
        for input in [
            "", "string", "0x", "0b2", "1e", "e5", ".", "1.2.3", "inf", "NaN", "+", "1e400",
            "-1e400", "0x-1",
        ] {
            assert_eq!(parse_numeric(input), None, "{input:?} should not be numeric");
        }
    }

    #[test]
    fn numeric_overflow_falls_back_to_float() {
        let n = parse_numeric("99999999999999999999").unwrap();
        assert!(n.is_f64());
    }

    #[test]
    fn radix_overflow_falls_back_to_float() {
        let two_to_the_63 = 9_223_372_036_854_775_808.0;
        assert_eq!(
            parse_numeric("0x8000000000000000").and_then(|n| n.as_f64()),
            Some(two_to_the_63)
        );
        assert_eq!(
            parse_numeric("-0b1000000000000000000000000000000000000000000000000000000000000000")
                .and_then(|n| n.as_f64()),
            Some(-two_to_the_63)
        );
        assert_eq!(
            parse_numeric("01000000000000000000000").and_then(|n| n.as_f64()),
            Some(two_to_the_63)
        );
        assert_eq!(parse_numeric("0x8000000000000000g"), None);
    }

    #[test]
    fn size_measures_by_kind() {
        assert_eq!(value_size(&json!("héllo"), false), 5.0);
        assert_eq!(value_size(&json!([1, 2, 3]), false), 3.0);
        assert_eq!(value_size(&json!({"a": 1}), false), 1.0);
        assert_eq!(value_size(&json!(12), true), 12.0);
        assert_eq!(value_size(&json!("12"), true), 12.0);
        assert_eq!(value_size(&json!(12), false), 2.0);
    }

    #[test]
    fn emptiness() {
        assert!(is_empty_value(None));
        assert!(is_empty_value(Some(&json!(null))));
        assert!(is_empty_value(Some(&json!("  "))));
        assert!(is_empty_value(Some(&json!([]))));
        assert!(is_empty_value(Some(&json!({}))));
        assert!(!is_empty_value(Some(&json!(0))));
        assert!(!is_empty_value(Some(&json!(false))));
    }
}
