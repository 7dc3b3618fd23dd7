//! Rule specifications.
//!
//! A field's rules are written as a pipe-separated string such as
//! `"required|numeric|min:5"`. Each segment is a rule name, optionally
//! followed by `:` and a comma-separated parameter list. Parsing never
//! fails; unknown names are reported when the rule is first evaluated.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rules whose parameter is taken verbatim instead of split on commas.
const VERBATIM_PARAM_RULES: &[&str] = &["regex", "not_regex"];

// ============================================================================
// RULE
// ============================================================================

/// One named rule with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    name: String,
    params: Vec<String>,
}

impl Rule {
    /// Creates a rule from a name and parameters.
    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a single `name:param,param` segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use gatekeep_validator::Rule;
    ///
    /// let rule = Rule::parse("between:1,10");
    /// assert_eq!(rule.name(), "between");
    /// assert_eq!(rule.params(), ["1", "10"]);
    /// ```
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        let Some((name, raw)) = segment.split_once(':') else {
            return Self::new(segment, Vec::<String>::new());
        };
        let name = name.trim();
        let params: Vec<String> = if VERBATIM_PARAM_RULES.contains(&name) {
            vec![raw.to_owned()]
        } else if raw.is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(|p| p.trim().to_owned()).collect()
        };
        Self {
            name: name.to_owned(),
            params,
        }
    }

    /// Rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters in declaration order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Parameter at `index`, if declared and non-empty.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params
            .get(index)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.params.is_empty() {
            write!(f, ":{}", self.params.join(","))?;
        }
        Ok(())
    }
}

// ============================================================================
// RULE SPEC
// ============================================================================

/// The ordered rules declared for one field.
///
/// # Examples
///
/// ```
/// use gatekeep_validator::RuleSpec;
///
/// let spec: RuleSpec = "required|numeric|min:5".parse().unwrap();
/// assert_eq!(spec.len(), 3);
/// assert!(spec.has("numeric"));
/// assert_eq!(spec.to_string(), "required|numeric|min:5");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSpec {
    rules: Vec<Rule>,
}

impl RuleSpec {
    /// Parses a pipe-separated rule string. Empty segments are skipped.
    pub fn parse(spec: &str) -> Self {
        Self::from_rules(
            spec.split('|')
                .filter(|segment| !segment.trim().is_empty())
                .map(Rule::parse),
        )
    }

    /// Builds a spec from already-split rules.
    pub fn from_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    /// `true` if a rule with this name is declared.
    pub fn has(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name == name)
    }

    /// First rule with this name.
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` if no rules are declared.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromStr for RuleSpec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for RuleSpec {
    fn from(spec: &str) -> Self {
        Self::parse(spec)
    }
}

impl From<String> for RuleSpec {
    fn from(spec: String) -> Self {
        Self::parse(&spec)
    }
}

impl From<&String> for RuleSpec {
    fn from(spec: &String) -> Self {
        Self::parse(spec)
    }
}

impl<const N: usize> From<[&str; N]> for RuleSpec {
    fn from(segments: [&str; N]) -> Self {
        Self::from_rules(segments.into_iter().map(Rule::parse))
    }
}

impl From<Vec<&str>> for RuleSpec {
    fn from(segments: Vec<&str>) -> Self {
        Self::from_rules(segments.into_iter().map(Rule::parse))
    }
}

impl From<Vec<Rule>> for RuleSpec {
    fn from(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl From<&RuleSpec> for RuleSpec {
    fn from(spec: &RuleSpec) -> Self {
        spec.clone()
    }
}

impl<'a> IntoIterator for &'a RuleSpec {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}
