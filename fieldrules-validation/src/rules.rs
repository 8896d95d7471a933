// Form validation on top of the rule table

use crate::errors::{ValidationError, ValidationErrors};
use crate::lookup::FieldLookup;
use crate::table::RuleTable;
use serde_json::Value;
use std::sync::Arc;

/// The rules applied to one field, in order
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: String,
    rules: Vec<(String, Option<Value>)>,
}

impl FieldRules {
    /// Create new validation rules for a field
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rules: Vec::new(),
        }
    }

    /// Apply a rule without a parameter
    pub fn rule(mut self, name: impl Into<String>) -> Self {
        self.rules.push((name.into(), None));
        self
    }

    /// Apply a rule with a parameter
    pub fn rule_with(mut self, name: impl Into<String>, param: impl Into<Value>) -> Self {
        self.rules.push((name.into(), Some(param.into())));
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Evaluate every rule against `value`, collecting one error per failure
    pub fn validate(&self, table: &RuleTable, value: &Value) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for (name, param) in &self.rules {
            match table.get(name) {
                Some(rule) if rule.check(value, param.as_ref()) => {}
                Some(_) => errors.push(ValidationError::rejected(
                    &self.field,
                    name,
                    value,
                    param.as_ref(),
                )),
                None => errors.push(ValidationError::unknown_rule(&self.field, name, value)),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates a whole form against per-field rules
#[derive(Debug, Clone)]
pub struct FormValidator {
    table: Arc<RuleTable>,
    fields: Vec<FieldRules>,
}

impl FormValidator {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self {
            table,
            fields: Vec::new(),
        }
    }

    /// Add rules for a field
    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    /// Validate every field's current value.
    ///
    /// Fields the form does not have are validated as `null`, so `required`
    /// reports them.
    pub fn validate(&self, form: &dyn FieldLookup) -> Result<(), ValidationErrors> {
        let mut all_errors = ValidationErrors::default();

        for rules in &self.fields {
            let value = form
                .field_value(rules.field())
                .map(Value::String)
                .unwrap_or(Value::Null);

            if let Err(errors) = rules.validate(&self.table, &value) {
                all_errors.extend(errors);
            }
        }

        if all_errors.is_empty() {
            Ok(())
        } else {
            Err(all_errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use crate::lookup::{FieldValues, NoFields};
    use serde_json::json;

    fn table() -> RuleTable {
        RuleTable::with_builtins(Arc::new(NoFields))
    }

    #[test]
    fn test_field_rules() {
        let rules = FieldRules::for_field("email").rule("required").rule("email");
        let table = table();

        assert!(rules.validate(&table, &json!("test@example.com")).is_ok());

        let errors = rules.validate(&table, &json!("invalid")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule, "email");
        assert_eq!(errors[0].value, json!("invalid"));

        let errors = rules.validate(&table, &json!("")).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_rule_with_param() {
        let rules = FieldRules::for_field("name").rule_with("max", 5).rule_with("min", 2);
        let table = table();

        assert!(rules.validate(&table, &json!("John")).is_ok());
        let errors = rules.validate(&table, &json!("Jonathan")).unwrap_err();
        assert_eq!(errors[0].message(), "name failed the max rule");
        assert_eq!(errors[0].param, Some(json!(5)));
    }

    #[test]
    fn test_unknown_rule_is_reported() {
        let rules = FieldRules::for_field("zip").rule("postcode");
        let errors = rules.validate(&table(), &json!("12345")).unwrap_err();
        assert_eq!(errors[0].kind, FailureKind::UnknownRule);
        assert_eq!(errors[0].rule, "postcode");
    }

    #[test]
    fn test_form_validator() {
        let form = FieldValues::new()
            .with_field("name", "John")
            .with_field("email", "john@example.com");

        let validator = FormValidator::new(Arc::new(table()))
            .field(FieldRules::for_field("name").rule("required").rule("alpha"))
            .field(FieldRules::for_field("email").rule("required").rule("email"));

        assert!(validator.validate(&form).is_ok());

        form.set("email", "john");
        let errors = validator.validate(&form).unwrap_err();
        assert_eq!(errors.failed_rules("email"), vec!["email"]);
        assert_eq!(errors.for_field("name").count(), 0);
    }

    #[test]
    fn test_missing_field_is_null() {
        let validator = FormValidator::new(Arc::new(table()))
            .field(FieldRules::for_field("age").rule("required"));

        let errors = validator.validate(&FieldValues::new()).unwrap_err();
        assert_eq!(errors.failed_rules("age"), vec!["required"]);
        assert_eq!(errors.iter().next().map(|e| &e.value), Some(&Value::Null));
    }
}
