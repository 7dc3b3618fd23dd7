//! Primitive type rules with coercion.
//!
//! Every rule here is implicit and passes for an absent field. A present
//! null is cleared from the working data and passes for `boolean`,
//! `integer` and `numeric`; `string` and `array` reject it unless the
//! field is `nullable`. A present non-null value that belongs to the type
//! is overwritten with its canonical form.

use serde_json::Value;

use crate::coerce;
use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;

/// Outcome of the shared absent / null preamble.
enum Presence<'a> {
    Settled(bool),
    Value(&'a Value),
}

fn clear_null<'a>(args: &RuleArgs<'a>, ctx: &mut EvaluationContext<'_>) -> Presence<'a> {
    match args.value {
        None => Presence::Settled(true),
        Some(Value::Null) => {
            ctx.remove_value(args.field);
            Presence::Settled(true)
        }
        Some(value) => Presence::Value(value),
    }
}

fn reject_null<'a>(args: &RuleArgs<'a>) -> Presence<'a> {
    match args.value {
        None => Presence::Settled(true),
        Some(Value::Null) => Presence::Settled(args.spec.has("nullable")),
        Some(value) => Presence::Value(value),
    }
}

/// `boolean`: coerces to `true` / `false`.
pub fn boolean(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let value = match clear_null(args, ctx) {
        Presence::Settled(passed) => return Ok(passed),
        Presence::Value(value) => value,
    };
    Ok(match coerce::to_boolean(value) {
        Some(b) => {
            ctx.set_value(args.field, Value::Bool(b));
            true
        }
        None => false,
    })
}

/// `integer`: coerces to an integer number.
pub fn integer(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let value = match clear_null(args, ctx) {
        Presence::Settled(passed) => return Ok(passed),
        Presence::Value(value) => value,
    };
    Ok(match coerce::to_integer(value) {
        Some(canonical) => {
            ctx.set_value(args.field, canonical);
            true
        }
        None => false,
    })
}

/// `numeric`: coerces numeric strings to numbers.
pub fn numeric(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let value = match clear_null(args, ctx) {
        Presence::Settled(passed) => return Ok(passed),
        Presence::Value(value) => value,
    };
    Ok(match coerce::to_numeric(value) {
        Some(canonical) => {
            ctx.set_value(args.field, canonical);
            true
        }
        None => false,
    })
}

/// `string`: strings only, left unchanged.
pub fn string(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(match reject_null(args) {
        Presence::Settled(passed) => passed,
        Presence::Value(value) => coerce::is_string(value),
    })
}

/// `array`: lists and maps, left unchanged.
pub fn array(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(match reject_null(args) {
        Presence::Settled(passed) => passed,
        Presence::Value(value) => coerce::is_array(value),
    })
}
