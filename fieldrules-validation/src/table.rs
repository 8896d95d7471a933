// Rule table

use crate::builtins;
use crate::config::RulesConfig;
use crate::errors::{Result, RuleError};
use crate::lookup::FieldLookup;
use crate::pattern::PatternCompiler;
use crate::rule::Rule;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Registry of named rules.
///
/// Tables are ordinary values: build one per form, per tenant or per test
/// and share it through an `Arc`. Insertion under an existing name replaces
/// the earlier rule; nothing is ever removed.
#[derive(Debug, Default)]
pub struct RuleTable {
    rules: RwLock<HashMap<String, Rule>>,
}

impl RuleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table holding every built-in rule with default limits.
    ///
    /// `lookup` serves the `confirmed` rule.
    pub fn with_builtins(lookup: Arc<dyn FieldLookup>) -> Self {
        Self::with_config(&RulesConfig::default(), lookup)
    }

    /// Create a table holding every built-in rule
    pub fn with_config(config: &RulesConfig, lookup: Arc<dyn FieldLookup>) -> Self {
        let table = Self::new();
        builtins::install(&table, lookup, Arc::new(PatternCompiler::new(config)));
        info!("Rule table ready with {} built-in rules", table.len());
        table
    }

    /// Get a rule by name
    pub fn get(&self, name: &str) -> Option<Rule> {
        self.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Invoke a rule by name
    pub fn check(&self, name: &str, value: &Value, param: Option<&Value>) -> Result<bool> {
        // clone out so the rule runs without holding the lock
        let rule = self
            .get(name)
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))?;
        Ok(rule.check(value, param))
    }

    /// Insert or replace a rule, returning the one it replaced
    pub fn insert(&self, name: impl Into<String>, rule: Rule) -> Option<Rule> {
        let name = name.into();
        let previous = self.write().insert(name.clone(), rule);
        if previous.is_some() {
            debug!("Replaced validation rule {}", name);
        }
        previous
    }

    /// Sorted rule names
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Rule>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Rule>> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }
}
