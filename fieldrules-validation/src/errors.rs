// Validation errors

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Errors raised when merging caller-supplied rules into a [`RuleTable`](crate::RuleTable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The entry is a plain value rather than a callable rule
    #[error("Validation rule: {name} must be a function.")]
    NotCallable { name: String },

    /// The entry declares more parameters than a rule may take
    #[error("Validation rule: {name} can have atmost 2 arguments.")]
    TooManyParameters { name: String, arity: usize },
}

impl RegistrationError {
    /// Name of the rule that was rejected
    pub fn rule_name(&self) -> &str {
        match self {
            RegistrationError::NotCallable { name }
            | RegistrationError::TooManyParameters { name, .. } => name,
        }
    }
}

/// Errors raised when invoking rules by name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),
}

pub type Result<T, E = RuleError> = std::result::Result<T, E>;

/// Why a field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The rule evaluated to false
    Rejected,
    /// The field names a rule the table does not have
    UnknownRule,
}

/// One rule that did not accept a field's value
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub rule: String,
    pub kind: FailureKind,
    /// Parameter the rule was applied with
    pub param: Option<Value>,
    /// Value that was checked; `null` for a field the form does not have
    pub value: Value,
}

impl ValidationError {
    /// `rule` evaluated to false for `value`
    pub fn rejected(field: &str, rule: &str, value: &Value, param: Option<&Value>) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            kind: FailureKind::Rejected,
            param: param.cloned(),
            value: value.clone(),
        }
    }

    /// `rule` is not in the table
    pub fn unknown_rule(field: &str, rule: &str, value: &Value) -> Self {
        Self {
            field: field.to_string(),
            rule: rule.to_string(),
            kind: FailureKind::UnknownRule,
            param: None,
            value: value.clone(),
        }
    }

    pub fn message(&self) -> String {
        match self.kind {
            FailureKind::Rejected => format!("{} failed the {} rule", self.field, self.rule),
            FailureKind::UnknownRule => {
                format!("{} references unknown rule {}", self.field, self.rule)
            }
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "field": self.field,
            "rule": self.rule,
            "kind": self.kind,
            "message": self.message(),
            "param": self.param,
            "value": self.value,
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Every failure from validating one form, in field then rule order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Failures recorded for `field`
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Names of the rules that failed for `field`, in evaluation order
    pub fn failed_rules(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.rule.as_str())
            .collect()
    }

    /// Fields with at least one failure, first failure first
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for error in &self.errors {
            if !fields.contains(&error.field.as_str()) {
                fields.push(&error.field);
            }
        }
        fields
    }

    /// `{"errors": [...]}` body for clients
    pub fn to_json(&self) -> Value {
        let errors: Vec<Value> = self.errors.iter().map(ValidationError::to_json).collect();
        json!({ "errors": errors })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl Extend<ValidationError> for ValidationErrors {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_error_messages() {
        let err = RegistrationError::NotCallable {
            name: "bad".to_string(),
        };
        assert_eq!(err.to_string(), "Validation rule: bad must be a function.");
        assert_eq!(err.rule_name(), "bad");

        let err = RegistrationError::TooManyParameters {
            name: "wide".to_string(),
            arity: 3,
        };
        assert_eq!(
            err.to_string(),
            "Validation rule: wide can have atmost 2 arguments."
        );
    }

    #[test]
    fn test_errors_to_json() {
        let errors = ValidationErrors::from(vec![
            ValidationError::rejected("email", "email", &json!("nope"), None),
            ValidationError::rejected("zip", "digits", &json!("123"), Some(&json!(5))),
            ValidationError::unknown_rule("zip", "postcode", &json!("123")),
        ]);

        let json = errors.to_json();
        assert_eq!(json["errors"][0]["rule"], "email");
        assert_eq!(json["errors"][0]["kind"], "rejected");
        assert_eq!(json["errors"][0]["message"], "email failed the email rule");
        assert_eq!(json["errors"][0]["value"], "nope");
        assert!(json["errors"][0]["param"].is_null());
        assert_eq!(json["errors"][1]["param"], 5);
        assert_eq!(json["errors"][2]["kind"], "unknown_rule");
        assert_eq!(json["errors"][2]["message"], "zip references unknown rule postcode");
    }

    #[test]
    fn test_errors_by_field() {
        let mut errors = ValidationErrors::default();
        errors.extend([
            ValidationError::rejected("age", "integer", &json!("1.5"), None),
            ValidationError::rejected("name", "required", &Value::Null, None),
            ValidationError::rejected("age", "min", &json!("1.5"), Some(&json!(18))),
        ]);

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.fields(), vec!["age", "name"]);
        assert_eq!(errors.failed_rules("age"), vec!["integer", "min"]);
        assert_eq!(errors.for_field("email").count(), 0);
        assert_eq!(errors.to_string(), "age failed the integer rule\nname failed the required rule\nage failed the min rule\n");
    }
}
