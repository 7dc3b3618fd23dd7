//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Default limit on nested composition depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Knobs that change how a [`Validator`](crate::Validator) evaluates.
///
/// # Examples
///
/// ```
/// use gatekeep_validator::EngineConfig;
///
/// let config = EngineConfig::default().with_max_depth(8).with_bail(true);
/// assert_eq!(config.max_depth, 8);
/// assert!(config.bail);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting depth for `nested` / `nested_collection`.
    ///
    /// Exceeding it aborts evaluation with
    /// [`ConfigError::RecursionLimit`](crate::ConfigError::RecursionLimit).
    pub max_depth: usize,

    /// Stop evaluating a field after its first failed rule.
    ///
    /// A field can opt in on its own with the `bail` rule.
    pub bail: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            bail: false,
        }
    }
}

impl EngineConfig {
    /// Sets the maximum nesting depth.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets whether every field stops at its first failed rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_bail(mut self, bail: bool) -> Self {
        self.bail = bail;
        self
    }
}
