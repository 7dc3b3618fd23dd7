//! The `exists` rule and its persistence collaborator.

use serde_json::Value;
use tracing::trace;

use crate::context::EvaluationContext;
use crate::error::ConfigError;
use crate::registry::RuleArgs;

/// Counts stored records whose `column` equals `value`.
///
/// Implementations typically query a database; the engine only needs the
/// count.
pub trait ExistenceChecker: Send + Sync {
    /// Number of records in `collection` with `column == value`.
    fn count(&self, collection: &str, column: &str, value: &Value) -> u64;
}

impl<F> ExistenceChecker for F
where
    F: Fn(&str, &str, &Value) -> u64 + Send + Sync,
{
    fn count(&self, collection: &str, column: &str, value: &Value) -> u64 {
        self(collection, column, value)
    }
}

/// `exists:collection[,column]`: the value is stored somewhere.
///
/// The column defaults to the field name.
pub fn exists(args: &RuleArgs<'_>, ctx: &mut EvaluationContext<'_>) -> Result<bool, ConfigError> {
    let collection = args.require_param(0)?;
    let column = args.param(1).unwrap_or(args.field);
    let checker = ctx
        .validator()
        .existence_checker()
        .ok_or_else(|| ConfigError::missing_collaborator("exists", "existence checker"))?;

    let Some(value) = args.value else {
        return Ok(false);
    };
    let found = checker.count(collection, column, value);
    trace!(collection, column, found, "existence check");
    Ok(found > 0)
}
