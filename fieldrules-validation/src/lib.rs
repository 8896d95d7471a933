//! Form field validation rules
//!
//! A [`RuleTable`] maps rule names (`required`, `email`, `max`, ...) to
//! predicates over loosely typed form values, and a [`Registrar`] merges
//! custom rules into it at runtime.
//!
//! # Examples
//!
//! ## Invoking rules by name
//!
//! ```
//! use fieldrules_validation::{NoFields, RuleTable};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let rules = RuleTable::with_builtins(Arc::new(NoFields));
//!
//! assert_eq!(rules.check("required", &json!("John"), None), Ok(true));
//! assert_eq!(rules.check("max", &json!(15), Some(&json!(10))), Ok(false));
//! assert_eq!(rules.check("max", &json!("abc"), Some(&json!(5))), Ok(true));
//! ```
//!
//! ## Registering custom rules
//!
//! ```
//! use fieldrules_validation::{NoFields, Registrar, Rule, RuleSet};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let registrar = Registrar::with_builtins(Arc::new(NoFields));
//!
//! let custom = RuleSet::new()
//!     .rule("starts_with", Rule::binary(|value, prefix| {
//!         match (value.as_str(), prefix.and_then(|p| p.as_str())) {
//!             (Some(value), Some(prefix)) => value.starts_with(prefix),
//!             _ => false,
//!         }
//!     }));
//! registrar.register(custom).unwrap();
//!
//! let rules = registrar.rules();
//! assert_eq!(rules.check("starts_with", &json!("INV-42"), Some(&json!("INV-"))), Ok(true));
//!
//! // non-callable entries are rejected
//! let broken = RuleSet::new().value("bad", json!("not a function"));
//! assert!(registrar.register(broken).is_err());
//! assert!(!rules.contains("bad"));
//! ```
//!
//! ## Confirmation fields
//!
//! ```
//! use fieldrules_validation::{FieldValues, RuleTable};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let form = Arc::new(FieldValues::new().with_field("password", "s3cret"));
//! let rules = RuleTable::with_builtins(form.clone());
//!
//! let param = json!("password");
//! assert_eq!(rules.check("confirmed", &json!("s3cret"), Some(&param)), Ok(true));
//!
//! form.set("password", "changed");
//! assert_eq!(rules.check("confirmed", &json!("s3cret"), Some(&param)), Ok(false));
//! ```
//!
//! ## Validating a form
//!
//! ```
//! use fieldrules_validation::{FieldRules, FieldValues, FormValidator, NoFields, RuleTable};
//! use std::sync::Arc;
//!
//! let validator = FormValidator::new(Arc::new(RuleTable::with_builtins(Arc::new(NoFields))))
//!     .field(FieldRules::for_field("username").rule("required").rule("alpha_dash"))
//!     .field(FieldRules::for_field("age").rule("integer").rule_with("min", 18));
//!
//! let form = FieldValues::new()
//!     .with_field("username", "john_doe")
//!     .with_field("age", "17");
//!
//! let errors = validator.validate(&form).unwrap_err();
//! assert_eq!(errors.failed_rules("age"), vec!["min"]);
//! ```

pub mod builtins;
mod config;
mod errors;
mod lookup;
mod pattern;
mod registrar;
mod rule;
mod rules;
mod table;
pub mod value;

pub use config::*;
pub use errors::*;
pub use lookup::*;
pub use pattern::*;
pub use registrar::*;
pub use rule::*;
pub use rules::*;
pub use table::*;
