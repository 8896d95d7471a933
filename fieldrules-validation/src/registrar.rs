// Custom rule registration

use crate::errors::RegistrationError;
use crate::lookup::FieldLookup;
use crate::rule::{adapt_dynamic, Rule, RuleCandidate, RuleSet};
use crate::table::RuleTable;
use std::sync::Arc;
use tracing::{debug, error};

/// Most parameters a rule may declare: the value and the rule parameter
pub const MAX_RULE_ARITY: usize = 2;

/// Validates caller-supplied rules and merges them into a [`RuleTable`].
#[derive(Debug, Clone)]
pub struct Registrar {
    table: Arc<RuleTable>,
}

impl Registrar {
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self { table }
    }

    /// Registrar over a fresh table of built-in rules
    pub fn with_builtins(lookup: Arc<dyn FieldLookup>) -> Self {
        Self::new(Arc::new(RuleTable::with_builtins(lookup)))
    }

    /// The live table
    pub fn rules(&self) -> &Arc<RuleTable> {
        &self.table
    }

    /// Merge `rules` into the table in order.
    ///
    /// The first unacceptable entry aborts the call. Entries merged before it
    /// stay merged; entries after it are not looked at.
    pub fn register(&self, rules: RuleSet) -> Result<(), RegistrationError> {
        for (name, candidate) in rules {
            let rule = match candidate {
                RuleCandidate::Rule(rule) => rule,
                RuleCandidate::Dynamic { arity, func } if arity <= MAX_RULE_ARITY => {
                    adapt_dynamic(arity, func)
                }
                RuleCandidate::Dynamic { arity, .. } => {
                    let err = RegistrationError::TooManyParameters { name, arity };
                    error!("{}", err);
                    return Err(err);
                }
                RuleCandidate::Opaque(_) => {
                    let err = RegistrationError::NotCallable { name };
                    error!("{}", err);
                    return Err(err);
                }
            };

            self.register_rule(name, rule);
        }

        Ok(())
    }

    /// Insert a single typed rule; arity is guaranteed by its type
    pub fn register_rule(&self, name: impl Into<String>, rule: Rule) {
        let name = name.into();
        debug!("Registering validation rule {} (arity {})", name, rule.arity());
        self.table.insert(name, rule);
    }
}
