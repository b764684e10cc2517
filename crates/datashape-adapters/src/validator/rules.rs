//! Rule-string validator.
//!
//! Understands a small pipe-free rule vocabulary, one rule per string:
//!
//! | Rule        | Passes when                                         |
//! |-------------|-----------------------------------------------------|
//! | `required`  | present and not null, `""` or empty                 |
//! | `nullable`  | always (marks null as acceptable)                   |
//! | `string`    | a string                                            |
//! | `integer`   | an integer, or a string holding one                 |
//! | `numeric`   | a number, or a string holding one                   |
//! | `boolean`   | `true`, `false`, `0`, `1`, `"0"`, `"1"`             |
//! | `array`     | a list or mapping                                   |
//! | `min:n`     | size ≥ n (numbers by value, strings by characters, lists by length) |
//! | `max:n`     | size ≤ n                                            |
//! | `in:a,b`    | one of the listed values                            |
//! | `email`     | a valid email address                               |
//! | `url`       | a valid URL                                         |
//!
//! Field keys are dot paths; `*` matches every element of a list.
//! Empty values are only checked against `required`.

use datashape_core::application::ports::Validator;
use datashape_core::domain::{Attributes, FieldErrors, Mapping, Messages, Rules, ValidationOutcome};
use serde_json::Value;
use tracing::{debug, warn};
use validator::{ValidateEmail, ValidateUrl};

/// One parsed rule.
#[derive(Debug, Clone, PartialEq)]
enum Rule {
    Required,
    Nullable,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Min(f64),
    Max(f64),
    In(Vec<String>),
    Email,
    Url,
}

impl Rule {
    fn parse(raw: &str) -> Option<Self> {
        let (name, args) = match raw.split_once(':') {
            Some((name, args)) => (name.trim(), Some(args)),
            None => (raw.trim(), None),
        };
        let rule = match (name, args) {
            ("required", None) => Self::Required,
            ("nullable", None) => Self::Nullable,
            ("string", None) => Self::String,
            ("integer", None) => Self::Integer,
            ("numeric", None) => Self::Numeric,
            ("boolean", None) => Self::Boolean,
            ("array", None) => Self::Array,
            ("email", None) => Self::Email,
            ("url", None) => Self::Url,
            ("min", Some(n)) => Self::Min(n.trim().parse().ok()?),
            ("max", Some(n)) => Self::Max(n.trim().parse().ok()?),
            ("in", Some(list)) => Self::In(list.split(',').map(|v| v.trim().to_string()).collect()),
            _ => return None,
        };
        Some(rule)
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Nullable => "nullable",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::In(_) => "in",
            Self::Email => "email",
            Self::Url => "url",
        }
    }

    fn passes(&self, value: &Value) -> bool {
        match self {
            Self::Required | Self::Nullable => true,
            Self::String => value.is_string(),
            Self::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            Self::Numeric => numeric(value).is_some(),
            Self::Boolean => {
                value.is_boolean()
                    || matches!(value.as_i64(), Some(0 | 1))
                    || matches!(value.as_str(), Some("0" | "1"))
            }
            Self::Array => value.is_array() || value.is_object(),
            Self::Min(min) => size(value).is_some_and(|size| size >= *min),
            Self::Max(max) => size(value).is_some_and(|size| size <= *max),
            Self::In(allowed) => scalar_text(value).is_some_and(|text| allowed.contains(&text)),
            Self::Email => matches!(value, Value::String(s) if s.validate_email()),
            Self::Url => matches!(value, Value::String(s) if s.validate_url()),
        }
    }

    fn default_message(&self, value: Option<&Value>) -> String {
        match self {
            Self::Required => "The :attribute field is required.".into(),
            Self::Nullable => String::new(),
            Self::String => "The :attribute field must be a string.".into(),
            Self::Integer => "The :attribute field must be an integer.".into(),
            Self::Numeric => "The :attribute field must be a number.".into(),
            Self::Boolean => "The :attribute field must be true or false.".into(),
            Self::Array => "The :attribute field must be an array.".into(),
            Self::Min(_) => match value {
                Some(Value::String(_)) => "The :attribute field must be at least :min characters.",
                Some(Value::Array(_) | Value::Object(_)) => {
                    "The :attribute field must have at least :min items."
                }
                _ => "The :attribute field must be at least :min.",
            }
            .into(),
            Self::Max(_) => match value {
                Some(Value::String(_)) => {
                    "The :attribute field must not be greater than :max characters."
                }
                Some(Value::Array(_) | Value::Object(_)) => {
                    "The :attribute field must not have more than :max items."
                }
                _ => "The :attribute field must not be greater than :max.",
            }
            .into(),
            Self::In(_) => "The selected :attribute is invalid.".into(),
            Self::Email => "The :attribute field must be a valid email address.".into(),
            Self::Url => "The :attribute field must be a valid URL.".into(),
        }
    }

    fn placeholders(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Min(n) => vec![(":min", format_number(*n))],
            Self::Max(n) => vec![(":max", format_number(*n))],
            Self::In(values) => vec![(":values", values.join(", "))],
            _ => Vec::new(),
        }
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn size(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        _ => None,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Resolve a dotted pattern against `input`, expanding `*` over list
/// elements and mapping entries. Missing named segments yield `None`.
fn expand<'v>(pattern: &str, input: &'v Mapping) -> Vec<(String, Option<&'v Value>)> {
    let mut segments = pattern.split('.');
    let Some(first) = segments.next() else {
        return Vec::new();
    };

    let mut current: Vec<(String, Option<&'v Value>)> = if first == "*" {
        input.iter().map(|(k, v)| (k.clone(), Some(v))).collect()
    } else {
        vec![(first.to_string(), input.get(first))]
    };

    for segment in segments {
        current = current
            .into_iter()
            .flat_map(|(path, value)| step(path, value, segment))
            .collect();
    }
    current
}

fn step<'v>(path: String, value: Option<&'v Value>, segment: &str) -> Vec<(String, Option<&'v Value>)> {
    match (segment, value) {
        ("*", Some(Value::Array(items))) => items
            .iter()
            .enumerate()
            .map(|(i, item)| (format!("{path}.{i}"), Some(item)))
            .collect(),
        ("*", Some(Value::Object(map))) => map
            .iter()
            .map(|(k, item)| (format!("{path}.{k}"), Some(item)))
            .collect(),
        ("*", _) => Vec::new(),
        (key, Some(Value::Object(map))) => vec![(format!("{path}.{key}"), map.get(key))],
        (key, Some(Value::Array(items))) => {
            let item = key.parse::<usize>().ok().and_then(|i| items.get(i));
            vec![(format!("{path}.{key}"), item)]
        }
        (key, _) => vec![(format!("{path}.{key}"), None)],
    }
}

/// Validator for rule strings such as `"required"` and `"max:20"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }

    fn message(
        rule: &Rule,
        pattern: &str,
        path: &str,
        value: Option<&Value>,
        messages: &Messages,
        attributes: &Attributes,
    ) -> String {
        let template = [
            format!("{path}.{}", rule.name()),
            format!("{pattern}.{}", rule.name()),
            rule.name().to_string(),
        ]
        .iter()
        .find_map(|key| messages.get(key).cloned())
        .unwrap_or_else(|| rule.default_message(value));

        let label = attributes
            .get(path)
            .or_else(|| attributes.get(pattern))
            .cloned()
            .unwrap_or_else(|| path.replace(['_', '.'], " "));

        rule.placeholders()
            .into_iter()
            .fold(template.replace(":attribute", &label), |message, (key, value)| {
                message.replace(key, &value)
            })
    }
}

impl Validator for RuleValidator {
    fn validate(
        &self,
        rules: &Rules,
        input: &Mapping,
        messages: &Messages,
        attributes: &Attributes,
    ) -> ValidationOutcome {
        let mut errors = FieldErrors::new();

        for (pattern, raw_rules) in rules.iter() {
            let parsed: Vec<Rule> = raw_rules
                .iter()
                .filter_map(|raw| {
                    let rule = Rule::parse(raw);
                    if rule.is_none() {
                        warn!(field = pattern, rule = %raw, "Ignoring unknown rule");
                    }
                    rule
                })
                .collect();

            for (path, value) in expand(pattern, input) {
                let failed: Vec<&Rule> = if is_empty(value) {
                    parsed.iter().filter(|r| **r == Rule::Required).collect()
                } else {
                    let value = value.unwrap_or(&Value::Null);
                    parsed.iter().filter(|r| !r.passes(value)).collect()
                };

                for rule in failed {
                    errors.add(
                        path.clone(),
                        Self::message(rule, pattern, &path, value, messages, attributes),
                    );
                }
            }
        }

        debug!(failed_fields = errors.len(), "Rule validation finished");
        ValidationOutcome::from_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Mapping {
        value.as_object().cloned().unwrap()
    }

    fn run(rules: Rules, value: Value) -> FieldErrors {
        match RuleValidator.validate(&rules, &input(value), &Messages::new(), &Attributes::new()) {
            ValidationOutcome::Passed => FieldErrors::new(),
            ValidationOutcome::Failed(errors) => errors,
        }
    }

    #[test]
    fn required_fails_on_empty_values() {
        let rules = Rules::new().field("name", ["required"]);

        for value in [json!({}), json!({"name": ""}), json!({"name": null}), json!({"name": []})] {
            let errors = run(rules.clone(), value);
            assert_eq!(errors.first("name"), Some("The name field is required."));
        }
        assert!(run(rules, json!({"name": "Ruben"})).is_empty());
    }

    #[test]
    fn empty_optional_values_skip_other_rules() {
        let rules = Rules::new().field("age", ["nullable", "integer"]);

        assert!(run(rules.clone(), json!({"age": null})).is_empty());
        assert!(run(rules.clone(), json!({})).is_empty());
        assert_eq!(
            run(rules, json!({"age": "x"})).first("age"),
            Some("The age field must be an integer.")
        );
    }

    #[test]
    fn size_rules_depend_on_value_type() {
        let rules = Rules::new()
            .field("title", ["max:5"])
            .field("year", ["min:1900"])
            .field("tags", ["min:2"]);

        let errors = run(
            rules,
            json!({"title": "Never gonna", "year": 1800, "tags": ["pop"]}),
        );

        assert_eq!(
            errors.first("title"),
            Some("The title field must not be greater than 5 characters.")
        );
        assert_eq!(errors.first("year"), Some("The year field must be at least 1900."));
        assert_eq!(errors.first("tags"), Some("The tags field must have at least 2 items."));
    }

    #[test]
    fn wildcards_expand_over_lists() {
        let rules = Rules::new().field("tracks.*.title", ["required", "string"]);

        let errors = run(
            rules,
            json!({"tracks": [{"title": "a"}, {"title": 3}, {"title": null}]}),
        );

        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["tracks.1.title", "tracks.2.title"]);
        assert_eq!(
            errors.first("tracks.2.title"),
            Some("The tracks 2 title field is required.")
        );
    }

    #[test]
    fn custom_messages_and_attributes() {
        let rules = Rules::new().field("name", ["required"]).field("mail", ["email"]);
        let messages = Messages::from([("name.required".to_string(), "Name is required".to_string())]);
        let attributes = Attributes::from([("mail".to_string(), "e-mail address".to_string())]);

        let outcome = RuleValidator.validate(
            &rules,
            &input(json!({"mail": "not-an-email"})),
            &messages,
            &attributes,
        );

        let ValidationOutcome::Failed(errors) = outcome else {
            panic!("expected failure");
        };
        assert_eq!(errors.first("name"), Some("Name is required"));
        assert_eq!(
            errors.first("mail"),
            Some("The e-mail address field must be a valid email address.")
        );
    }

    #[test]
    fn in_boolean_url_and_numeric() {
        let rules = Rules::new()
            .field("genre", ["in:pop,rock"])
            .field("explicit", ["boolean"])
            .field("link", ["url"])
            .field("rating", ["numeric"]);

        assert!(run(
            rules.clone(),
            json!({"genre": "pop", "explicit": 1, "link": "https://example.com", "rating": "4.5"})
        )
        .is_empty());

        let errors = run(
            rules,
            json!({"genre": "jazz", "explicit": "yes", "link": "nope", "rating": "high"}),
        );
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.first("genre"), Some("The selected genre is invalid."));
    }

    #[test]
    fn unknown_rules_are_ignored() {
        assert_eq!(Rule::parse("exists:users"), None);
        assert_eq!(Rule::parse("max:abc"), None);
        assert_eq!(Rule::parse("max:20"), Some(Rule::Max(20.0)));
        assert!(run(Rules::new().field("a", ["unique"]), json!({"a": 1})).is_empty());
    }
}
