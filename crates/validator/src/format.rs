//! Message rendering.
//!
//! The engine decides *which* message a failure gets (a per-field
//! override, a per-rule override, or none) and hands that choice to a
//! [`MessageFormatter`] together with the failing field, rule and
//! parameters. Template lookup and placeholder substitution belong to the
//! formatter.

use std::collections::HashMap;

/// Everything a formatter needs to render one failure.
#[derive(Debug, Clone, Copy)]
pub struct MessageRequest<'a> {
    /// Field path the failure is recorded at.
    pub field: &'a str,
    /// Name of the failed rule.
    pub rule: &'a str,
    /// Parameters the rule was declared with.
    pub params: &'a [String],
    /// Override template chosen by the engine, if any.
    pub template: Option<&'a str>,
}

impl MessageRequest<'_> {
    /// Translation key for the rule: `validation.<rule>`.
    pub fn key(&self) -> String {
        format!("validation.{}", self.rule)
    }
}

/// Turns a failure into the string stored in the message bag.
pub trait MessageFormatter: Send + Sync {
    /// Renders one message.
    fn render(&self, request: &MessageRequest<'_>) -> String;
}

impl<F> MessageFormatter for F
where
    F: Fn(&MessageRequest<'_>) -> String + Send + Sync,
{
    fn render(&self, request: &MessageRequest<'_>) -> String {
        self(request)
    }
}

// ============================================================================
// KEY FORMATTER
// ============================================================================

/// Returns the override template verbatim, or the rule's translation key.
///
/// Useful when a translation layer sits outside the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyFormatter;

impl MessageFormatter for KeyFormatter {
    fn render(&self, request: &MessageRequest<'_>) -> String {
        request
            .template
            .map_or_else(|| request.key(), str::to_owned)
    }
}

// ============================================================================
// TEMPLATE FORMATTER
// ============================================================================

const DEFAULT_TEMPLATES: &[(&str, &str)] = &[
    ("accepted", "The :attribute must be accepted."),
    ("alpha", "The :attribute may only contain letters."),
    (
        "alpha_dash",
        "The :attribute may only contain letters, numbers, dashes and underscores.",
    ),
    ("alpha_num", "The :attribute may only contain letters and numbers."),
    ("array", "The :attribute must be an array."),
    ("between", "The :attribute must be between :min and :max."),
    ("boolean", "The :attribute field must be true or false."),
    ("different", "The :attribute and :other must be different."),
    ("digits", "The :attribute must be :digits digits."),
    ("email", "The :attribute must be a valid email address."),
    ("exists", "The selected :attribute is invalid."),
    ("filled", "The :attribute field must have a value."),
    ("in", "The selected :attribute is invalid."),
    ("integer", "The :attribute must be an integer."),
    ("max", "The :attribute may not be greater than :max."),
    ("min", "The :attribute must be at least :min."),
    ("not_in", "The selected :attribute is invalid."),
    ("numeric", "The :attribute must be a number."),
    ("present", "The :attribute field must be present."),
    ("regex", "The :attribute format is invalid."),
    ("required", "The :attribute field is required."),
    (
        "required_with",
        "The :attribute field is required when :values is present.",
    ),
    (
        "required_without",
        "The :attribute field is required when :values is not present.",
    ),
    ("same", "The :attribute and :other must match."),
    ("size", "The :attribute must be :size."),
    ("string", "The :attribute must be a string."),
];

/// English templates with `:placeholder` substitution.
///
/// Supported placeholders: `:attribute`, `:min`, `:max`, `:size`,
/// `:digits`, `:values` and `:other`. Rules without a template render as
/// their translation key.
#[derive(Debug, Clone)]
pub struct TemplateFormatter {
    templates: HashMap<String, String>,
}

impl Default for TemplateFormatter {
    fn default() -> Self {
        Self {
            templates: DEFAULT_TEMPLATES
                .iter()
                .map(|(rule, template)| ((*rule).to_owned(), (*template).to_owned()))
                .collect(),
        }
    }
}

impl TemplateFormatter {
    /// Creates a formatter with the built-in English templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the default template for `rule`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_template(mut self, rule: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(rule.into(), template.into());
        self
    }

    fn replacements(request: &MessageRequest<'_>) -> Vec<(&'static str, String)> {
        let p = |i: usize| request.params.get(i).cloned().unwrap_or_default();
        let mut pairs = vec![(":attribute", humanize(request.field))];
        match request.rule {
            "min" => pairs.push((":min", p(0))),
            "max" => pairs.push((":max", p(0))),
            "between" => {
                pairs.push((":min", p(0)));
                pairs.push((":max", p(1)));
            }
            "size" => pairs.push((":size", p(0))),
            "digits" => pairs.push((":digits", p(0))),
            "same" | "different" => pairs.push((":other", humanize(&p(0)))),
            "in" | "not_in" | "required_with" | "required_without" => {
                let values: Vec<String> = request
                    .params
                    .iter()
                    .map(String::as_str)
                    .map(humanize)
                    .collect();
                pairs.push((":values", values.join(", ")));
            }
            _ => {}
        }
        pairs
    }
}

impl MessageFormatter for TemplateFormatter {
    fn render(&self, request: &MessageRequest<'_>) -> String {
        let template = request
            .template
            .or_else(|| self.templates.get(request.rule).map(String::as_str));
        let Some(template) = template else {
            return request.key();
        };

        let mut message = template.to_owned();
        for (placeholder, value) in Self::replacements(request) {
            message = message.replace(placeholder, &value);
        }
        message
    }
}

/// `home_address` and `nested.0.home_address` read as `home address`.
fn humanize(field: &str) -> String {
    let last = field.rsplit('.').next().unwrap_or(field);
    last.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn request<'a>(field: &'a str, rule: &'a str, params: &'a [String]) -> MessageRequest<'a> {
        MessageRequest {
            field,
            rule,
            params,
            template: None,
        }
    }

    #[test]
    fn substitutes_rule_parameters() {
        let params = vec!["5".to_owned()];
        let message = TemplateFormatter::new().render(&request("age", "min", &params));
        assert_eq!(message, "The age must be at least 5.");

        let params = vec!["1".to_owned(), "10".to_owned()];
        let message = TemplateFormatter::new().render(&request("shoe_size", "between", &params));
        assert_eq!(message, "The shoe size must be between 1 and 10.");
    }

    #[test]
    fn override_template_wins() {
        let mut req = request("age", "isOdd", &[]);
        req.template = Some("Age out of bound");
        assert_eq!(TemplateFormatter::new().render(&req), "Age out of bound");
    }

    #[test]
    fn unknown_rule_falls_back_to_key() {
        assert_eq!(
            TemplateFormatter::new().render(&request("age", "isOdd", &[])),
            "validation.isOdd"
        );
        assert_eq!(
            KeyFormatter.render(&request("age", "min", &[])),
            "validation.min"
        );
    }

    #[test]
    fn custom_default_template() {
        let formatter = TemplateFormatter::new().with_template("isOdd", "The :attribute must be odd.");
        assert_eq!(
            formatter.render(&request("age", "isOdd", &[])),
            "The age must be odd."
        );
    }

    fn compact(req: &MessageRequest<'_>) -> String {
        format!("{}:{}", req.field, req.rule)
    }

    #[test]
    fn functions_are_formatters() {
        assert_eq!(compact.render(&request("age", "min", &[])), "age:min");
    }
}
