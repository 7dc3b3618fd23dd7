//! String format rules.

use std::borrow::Cow;

use regex::Regex;
use serde_json::Value;

use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;

const DELIMITERS: &[char] = &['/', '#', '~', '!', '%', '@'];

/// Compiles a `regex` parameter.
///
/// Accepts bare patterns (`^[a-z]+$`) as well as delimited ones with
/// trailing flags (`/^[a-z]+$/i`). Flags `i`, `m`, `s`, `x` and `U` map to
/// the inline flags of the same name; `u` and `D` are accepted and ignored.
pub fn compile_pattern(raw: &str) -> Result<Regex, regex::Error> {
    Regex::new(&strip_delimiters(raw))
}

fn strip_delimiters(raw: &str) -> Cow<'_, str> {
    let Some(open) = raw.chars().next().filter(|c| DELIMITERS.contains(c)) else {
        return Cow::Borrowed(raw);
    };
    let Some(close) = raw.rfind(open).filter(|&pos| pos > 0) else {
        return Cow::Borrowed(raw);
    };
    let flags = &raw[close + 1..];
    if !flags.chars().all(|c| "imsxuUD".contains(c)) {
        return Cow::Borrowed(raw);
    }

    let body = &raw[open.len_utf8()..close];
    let inline: String = flags.chars().filter(|c| "imsxU".contains(*c)).collect();
    if inline.is_empty() {
        Cow::Borrowed(body)
    } else {
        Cow::Owned(format!("(?{inline}){body}"))
    }
}

fn text(value: Option<&Value>) -> Option<Cow<'_, str>> {
    match value? {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        _ => None,
    }
}

fn matches_pattern(args: &RuleArgs<'_>, ctx: &EvaluationContext<'_>) -> Result<Option<bool>, ConfigError> {
    let raw = args.require_param(0)?;
    let Some(subject) = text(args.value) else {
        return Ok(None);
    };
    let matched = match ctx.validator().rules().pattern(raw) {
        Some(regex) => regex.is_match(&subject),
        None => compile_pattern(raw)
            .map_err(|err| ConfigError::InvalidPattern {
                field: args.field.to_owned(),
                pattern: raw.to_owned(),
                reason: err.to_string(),
            })?
            .is_match(&subject),
    };
    Ok(Some(matched))
}

/// `regex:pattern`
pub fn regex(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(matches_pattern(args, ctx)? == Some(true))
}

/// `not_regex:pattern`
pub fn not_regex(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(matches_pattern(args, ctx)? == Some(false))
}

/// `email`: `local@domain.tld` without whitespace.
pub fn email(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let Some(Value::String(address)) = args.value else {
        return Ok(false);
    };
    Ok(is_email(address))
}

fn is_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') || local.len() > 64 {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

/// `alpha`: letters only.
pub fn alpha(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(match args.value {
        Some(Value::String(s)) => !s.is_empty() && s.chars().all(char::is_alphabetic),
        _ => false,
    })
}

/// `alpha_num`: letters and digits.
pub fn alpha_num(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(text(args.value).is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric)))
}

/// `alpha_dash`: letters, digits, `-` and `_`.
pub fn alpha_dash(args: &RuleArgs<'_>, _ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    Ok(text(args.value).is_some_and(|s| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    }))
}
