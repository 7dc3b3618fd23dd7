//! Membership and cross-field comparison rules.

use serde_json::Value;

use crate::coerce::scalar_string;
use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;

/// Every scalar of `value` (the value itself, or each list element) is
/// compared by its string form.
fn all_scalars(value: &Value, mut predicate: impl FnMut(&str) -> bool) -> bool {
    match value {
        Value::Array(items) => items
            .iter()
            .all(|item| scalar_string(item).is_some_and(|s| predicate(&s))),
        other => scalar_string(other).is_some_and(|s| predicate(&s)),
    }
}

/// `in:a,b,c`
pub fn in_list(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let allowed = args.params();
    Ok(args
        .value
        .is_some_and(|value| all_scalars(value, |s| allowed.iter().any(|a| a == s))))
}

/// `not_in:a,b,c`
pub fn not_in_list(
    args: &RuleArgs<'_>,
    _ctx: &mut EvaluationContext<'_>,
) -> Result<bool, ConfigError> {
    let denied = args.params();
    Ok(args
        .value
        .is_some_and(|value| all_scalars(value, |s| !denied.iter().any(|d| d == s))))
}

/// `same:other`: equal to another field's value.
pub fn same(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let other = args.require_param(0)?;
    Ok(args.value.is_some() && args.value == ctx.value(other))
}

/// `different:other`: not equal to another field's value.
pub fn different(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let other = args.require_param(0)?;
    Ok(args.value != ctx.value(other))
}
