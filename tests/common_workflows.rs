//! Integration tests for common fieldrules workflows.
//!
//! These tests verify that the most common use cases work correctly.

use fieldrules::prelude::*;
use serde_json::{Value, json};
use std::sync::Arc;

// =============================================================================
// Built-in Rule Tests
// =============================================================================

#[test]
fn test_builtin_rules_by_name() {
    let rules = RuleTable::with_builtins(Arc::new(NoFields));

    // Presence and length
    assert_eq!(rules.check("required", &json!("John"), None), Ok(true));
    assert_eq!(rules.check("required", &json!(" "), None), Ok(false));
    assert_eq!(rules.check("digits", &json!("12345"), Some(&json!(5))), Ok(true));
    assert_eq!(rules.check("digit_between", &json!("123"), Some(&json!(5))), Ok(true));

    // Numeric comparisons fall back to length for text
    assert_eq!(rules.check("min", &json!("abc"), Some(&json!(2))), Ok(true));
    assert_eq!(rules.check("min", &json!(1), Some(&json!(2))), Ok(false));

    // Formats
    assert_eq!(rules.check("url", &json!("see https://example.com"), None), Ok(true));
    assert_eq!(rules.check("alpha_num", &json!("abc123"), None), Ok(true));
    assert_eq!(rules.check("alpha_dash", &json!("abc-12_3"), None), Ok(true));
    assert_eq!(rules.check("alpha", &json!("abc1"), None), Ok(false));
    assert_eq!(rules.check("array", &json!([1, 2]), None), Ok(true));

    // Type-ish checks
    assert_eq!(rules.check("boolean", &json!("false"), None), Ok(true));
    assert_eq!(rules.check("numeric", &json!("3.14"), None), Ok(true));
    assert_eq!(rules.check("numeric", &json!(true), None), Ok(false));

    // Files
    assert_eq!(rules.check("video", &json!("clip.MP4"), None), Ok(true));
    assert_eq!(rules.check("image", &json!("clip.mp4"), None), Ok(false));
}

#[test]
fn test_unknown_rule_is_an_error() {
    let rules = RuleTable::with_builtins(Arc::new(NoFields));
    assert_eq!(
        rules.check("postcode", &json!("12345"), None),
        Err(RuleError::UnknownRule("postcode".to_string()))
    );
}

// =============================================================================
// Registration Tests
// =============================================================================

#[test]
fn test_custom_rules_extend_builtins() {
    let registrar = Registrar::with_builtins(Arc::new(NoFields));
    let builtins = registrar.rules().len();

    registrar
        .register(
            RuleSet::new()
                .rule("even", Rule::unary(|v| v.as_i64().is_some_and(|n| n % 2 == 0)))
                .rule(
                    "ends_with",
                    Rule::binary(|v, p| match (v.as_str(), p.and_then(Value::as_str)) {
                        (Some(value), Some(suffix)) => value.ends_with(suffix),
                        _ => false,
                    }),
                ),
        )
        .unwrap();

    let rules = registrar.rules();
    assert_eq!(rules.len(), builtins + 2);
    assert_eq!(rules.check("even", &json!(8), None), Ok(true));
    assert_eq!(rules.check("ends_with", &json!("a.csv"), Some(&json!(".csv"))), Ok(true));
    assert_eq!(rules.check("email", &json!("a@b.co"), None), Ok(true));
}

#[test]
fn test_registration_errors_report_rule_name() {
    let registrar = Registrar::with_builtins(Arc::new(NoFields));

    let err = registrar
        .register(RuleSet::new().value("broken", json!(42)))
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation rule: broken must be a function.");

    let err = registrar
        .register(RuleSet::new().dynamic("wide", 3, |_| true))
        .unwrap_err();
    assert_eq!(err.to_string(), "Validation rule: wide can have atmost 2 arguments.");
    assert_eq!(err.rule_name(), "wide");
}

// =============================================================================
// Form Validation Tests
// =============================================================================

#[test]
fn test_signup_form_workflow() {
    let form = Arc::new(
        FieldValues::new()
            .with_field("email", "jane@example.com")
            .with_field("password", "hunter22")
            .with_field("password_confirmation", "hunter22")
            .with_field("avatar", "me.png"),
    );
    let rules = Arc::new(RuleTable::with_builtins(form.clone()));

    let validator = FormValidator::new(rules)
        .field(FieldRules::for_field("email").rule("required").rule("email"))
        .field(FieldRules::for_field("password").rule("required").rule_with("min", 8))
        .field(
            FieldRules::for_field("password_confirmation")
                .rule("required")
                .rule_with("confirmed", "password"),
        )
        .field(FieldRules::for_field("avatar").rule("image"));

    assert!(validator.validate(&*form).is_ok());

    form.set("password_confirmation", "hunter2");
    form.set("avatar", "me.exe");

    let errors = validator.validate(&*form).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.failed_rules("password_confirmation"), vec!["confirmed"]);
    assert_eq!(errors.failed_rules("avatar"), vec!["image"]);
}

#[test]
fn test_errors_serialize_for_clients() {
    let validator = FormValidator::new(Arc::new(RuleTable::with_builtins(Arc::new(NoFields))))
        .field(FieldRules::for_field("age").rule("integer"));

    let errors = validator
        .validate(&FieldValues::new().with_field("age", "12.5"))
        .unwrap_err();

    let json = errors.to_json();
    assert_eq!(json["errors"][0]["field"], "age");
    assert_eq!(json["errors"][0]["rule"], "integer");
    assert_eq!(json["errors"][0]["message"], "age failed the integer rule");
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[cfg(feature = "config")]
#[test]
fn test_rules_config_from_file() {
    use fieldrules::fieldrules_config::ConfigManager;
    use std::io::Write;

    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "pattern_cache_capacity = 4").unwrap();
    writeln!(file, "pattern_nest_limit = 8").unwrap();

    let manager = ConfigManager::new();
    manager.load_file(file.path()).unwrap();

    let config = RulesConfig::from_manager(&manager).unwrap();
    assert_eq!(config.pattern_cache_capacity, 4);
    assert_eq!(config.pattern_nest_limit, 8);
    assert_eq!(config.pattern_size_limit, RulesConfig::default().pattern_size_limit);

    let rules = RuleTable::with_config(&config, Arc::new(NoFields));
    assert_eq!(rules.check("regex", &json!("abc"), Some(&json!("/^a/"))), Ok(true));
}
