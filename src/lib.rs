// Fieldrules - named validation rules for form fields
//
// This library maps rule names to predicates over form values and lets
// applications register their own rules next to the built-in ones.

// Re-export the rule engine
pub use fieldrules_validation::*;

// Re-export optional crates
#[cfg(feature = "config")]
pub use fieldrules_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        FailureKind, FieldLookup, FieldRules, FieldValues, FormValidator, NoFields, RegistrationError,
        Registrar, Rule, RuleError, RuleSet, RuleTable, RulesConfig, ValidationError,
        ValidationErrors,
    };
}
