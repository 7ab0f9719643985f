//! Reusable attribute validators
//!
//! Validators only see known, non-null values; [`crate::schema::Schema::validate`]
//! filters the rest out before calling them.

use crate::schema::{Validator, ValidatorRequest, ValidatorResponse};
use crate::types::{Diagnostic, Dynamic};

fn respond(diagnostics: Vec<Diagnostic>) -> ValidatorResponse {
    ValidatorResponse { diagnostics }
}

/// Bounds the length of a string, counted in characters
pub struct StringLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl StringLengthValidator {
    pub fn at_least(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl Validator for StringLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("string length must be between {} and {}", min, max),
            (Some(min), None) => format!("string length must be at least {}", min),
            (None, Some(max)) => format!("string length must be at most {}", max),
            (None, None) => "any string length".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(s) = request.config_value.value.as_str() else {
            return respond(vec![]);
        };
        let len = s.chars().count();
        let too_short = self.min.is_some_and(|min| len < min);
        let too_long = self.max.is_some_and(|max| len > max);
        if too_short || too_long {
            return respond(vec![Diagnostic::error(
                "Invalid Attribute Value Length",
                format!(
                    "Attribute {} {}, got: {}",
                    request.path,
                    self.description(),
                    len
                ),
            )
            .with_attribute(request.path)]);
        }
        respond(vec![])
    }
}

/// Requires a string to match a regular expression
pub struct StringPatternValidator {
    pattern: Result<regex::Regex, regex::Error>,
    description: String,
}

impl StringPatternValidator {
    /// An invalid pattern is reported as a diagnostic when the validator runs
    pub fn new(pattern: &str, description: impl Into<String>) -> Self {
        Self {
            pattern: regex::Regex::new(pattern),
            description: description.into(),
        }
    }
}

impl Validator for StringPatternValidator {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(s) = request.config_value.value.as_str() else {
            return respond(vec![]);
        };
        match &self.pattern {
            Ok(pattern) if pattern.is_match(s) => respond(vec![]),
            Ok(_) => respond(vec![Diagnostic::error(
                "Invalid Attribute Value Match",
                format!(
                    "Attribute {} {}, got: {}",
                    request.path, self.description, s
                ),
            )
            .with_attribute(request.path)]),
            Err(e) => respond(vec![Diagnostic::error(
                "Invalid validator pattern",
                format!("Pattern for attribute {} does not compile: {}", request.path, e),
            )
            .with_attribute(request.path)]),
        }
    }
}

/// Restricts a string to a fixed set of values
pub struct StringOneOfValidator {
    pub allowed: Vec<String>,
}

impl StringOneOfValidator {
    pub fn new(allowed: &[&str]) -> Self {
        Self {
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Validator for StringOneOfValidator {
    fn description(&self) -> String {
        format!("value must be one of: {:?}", self.allowed)
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        match request.config_value.value.as_str() {
            Some(s) if !self.allowed.iter().any(|a| a == s) => respond(vec![Diagnostic::error(
                "Invalid Attribute Value Match",
                format!(
                    "Attribute {} {}, got: \"{}\"",
                    request.path,
                    self.description(),
                    s
                ),
            )
            .with_attribute(request.path)]),
            _ => respond(vec![]),
        }
    }
}

/// Bounds a number, optionally requiring it to be integral
pub struct NumberRangeValidator {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub integer_only: bool,
}

impl NumberRangeValidator {
    /// Inclusive integer range, the common case for appliance settings
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            integer_only: true,
        }
    }
}

impl Validator for NumberRangeValidator {
    fn description(&self) -> String {
        let kind = if self.integer_only { "integer" } else { "number" };
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("{} must be between {} and {}", kind, min, max),
            (Some(min), None) => format!("{} must be at least {}", kind, min),
            (None, Some(max)) => format!("{} must be at most {}", kind, max),
            (None, None) => format!("any {}", kind),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(n) = request.config_value.value.as_number() else {
            return respond(vec![]);
        };
        let out_of_range =
            self.min.is_some_and(|min| n < min) || self.max.is_some_and(|max| n > max);
        let not_integral = self.integer_only && n.fract() != 0.0;
        if out_of_range || not_integral {
            return respond(vec![Diagnostic::error(
                "Invalid Attribute Value",
                format!("Attribute {} {}, got: {}", request.path, self.description(), n),
            )
            .with_attribute(request.path)]);
        }
        respond(vec![])
    }
}

/// Bounds the number of elements in a list or set
pub struct ListLengthValidator {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl ListLengthValidator {
    pub fn at_least(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

impl Validator for ListLengthValidator {
    fn description(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("list must contain between {} and {} elements", min, max),
            (Some(min), None) => format!("list must contain at least {} elements", min),
            (None, Some(max)) => format!("list must contain at most {} elements", max),
            (None, None) => "any list length".to_string(),
        }
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return respond(vec![]);
        };
        let len = items.len();
        if self.min.is_some_and(|min| len < min) || self.max.is_some_and(|max| len > max) {
            return respond(vec![Diagnostic::error(
                "Invalid Attribute Value",
                format!("Attribute {} {}, got: {}", request.path, self.description(), len),
            )
            .with_attribute(request.path)]);
        }
        respond(vec![])
    }
}

/// Rejects lists containing the same value twice
pub struct UniqueValuesValidator;

impl Validator for UniqueValuesValidator {
    fn description(&self) -> String {
        "all list elements must be unique".to_string()
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return respond(vec![]);
        };
        let mut diagnostics = Vec::new();
        for (i, item) in items.iter().enumerate() {
            if items[..i].contains(item) {
                let path = request.path.clone().index(i as i64);
                diagnostics.push(
                    Diagnostic::error(
                        "Duplicate List Value",
                        format!("This attribute contains duplicate values of: {}", render(item)),
                    )
                    .with_attribute(path),
                );
            }
        }
        respond(diagnostics)
    }
}

/// Applies a validator to every element of a list
pub struct ListElementsValidator {
    pub inner: Box<dyn Validator>,
}

impl ListElementsValidator {
    pub fn new(inner: impl Validator + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }
}

impl Validator for ListElementsValidator {
    fn description(&self) -> String {
        format!("each element: {}", self.inner.description())
    }

    fn validate(&self, request: ValidatorRequest) -> ValidatorResponse {
        let Some(items) = request.config_value.value.as_list() else {
            return respond(vec![]);
        };
        let diagnostics = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .flat_map(|(i, item)| {
                self.inner
                    .validate(ValidatorRequest {
                        config_value: crate::types::DynamicValue::new(item.clone()),
                        path: request.path.clone().index(i as i64),
                    })
                    .diagnostics
            })
            .collect();
        respond(diagnostics)
    }
}

fn render(value: &Dynamic) -> String {
    match value {
        Dynamic::String(s) => format!("\"{}\"", s),
        other => serde_json::Value::from(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributePath, DynamicValue};

    fn request(json: &str) -> ValidatorRequest {
        ValidatorRequest {
            config_value: DynamicValue::decode_json(json.as_bytes()).unwrap(),
            path: AttributePath::new("attr"),
        }
    }

    #[test]
    fn string_length_validator_accepts_valid_length() {
        let validator = StringLengthValidator::between(4, 64);
        assert!(validator.validate(request(r#""mail""#)).diagnostics.is_empty());
    }

    #[test]
    fn string_length_validator_rejects_short_and_long_values() {
        let validator = StringLengthValidator::between(4, 6);
        assert_eq!(validator.validate(request(r#""abc""#)).diagnostics.len(), 1);
        assert_eq!(validator.validate(request(r#""abcdefg""#)).diagnostics.len(), 1);
    }

    #[test]
    fn pattern_validator_matches_prefix() {
        let validator = StringPatternValidator::new("^/ifs/", "must start with /ifs/");
        assert!(validator
            .validate(request(r#""/ifs/data/ws""#))
            .diagnostics
            .is_empty());

        let diags = validator.validate(request(r#""/tmp/ws""#)).diagnostics;
        assert_eq!(diags.len(), 1);
        assert!(diags[0].detail.contains("must start with /ifs/"));
    }

    #[test]
    fn invalid_pattern_surfaces_as_diagnostic() {
        let validator = StringPatternValidator::new("(unclosed", "broken");
        let diags = validator.validate(request(r#""x""#)).diagnostics;
        assert_eq!(diags[0].summary, "Invalid validator pattern");
    }

    #[test]
    fn one_of_validator() {
        let validator = StringOneOfValidator::new(&["all", "v2only", "none"]);
        assert!(validator.validate(request(r#""v2only""#)).diagnostics.is_empty());
        assert_eq!(validator.validate(request(r#""v1""#)).diagnostics.len(), 1);
    }

    #[test]
    fn number_range_rejects_fractions_and_out_of_range() {
        let validator = NumberRangeValidator::between(1.0, 3600.0);
        assert!(validator.validate(request("10")).diagnostics.is_empty());
        assert_eq!(validator.validate(request("0")).diagnostics.len(), 1);
        assert_eq!(validator.validate(request("1.5")).diagnostics.len(), 1);
        assert_eq!(validator.validate(request("3601")).diagnostics.len(), 1);
    }

    #[test]
    fn list_length_and_uniqueness() {
        let length = ListLengthValidator::between(0, 2);
        assert_eq!(
            length
                .validate(request(r#"["a", "b", "c"]"#))
                .diagnostics
                .len(),
            1
        );

        let unique = UniqueValuesValidator;
        let diags = unique.validate(request(r#"["a", "b", "a"]"#)).diagnostics;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute, Some(AttributePath::new("attr").index(2)));
    }

    #[test]
    fn list_elements_validator_addresses_each_element() {
        let validator = ListElementsValidator::new(StringLengthValidator::between(4, 2048));
        let diags = validator
            .validate(request(r#"["ldap://server", "ab"]"#))
            .diagnostics;
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].attribute, Some(AttributePath::new("attr").index(1)));
    }
}
