// Field value lookup

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Resolves a form field's current value by its identifier.
///
/// Returns `None` when no such field exists.
pub trait FieldLookup: Send + Sync {
    fn field_value(&self, field_id: &str) -> Option<String>;
}

impl<F> FieldLookup for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn field_value(&self, field_id: &str) -> Option<String> {
        self(field_id)
    }
}

/// A lookup with no fields at all
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFields;

impl FieldLookup for NoFields {
    fn field_value(&self, _field_id: &str) -> Option<String> {
        None
    }
}

/// In-memory form state: field id to current text value.
///
/// Values can be updated through a shared reference, so one `Arc<FieldValues>`
/// can back both a [`RuleTable`](crate::RuleTable) (for `confirmed`) and the
/// code that edits the form.
#[derive(Debug, Default)]
pub struct FieldValues {
    fields: RwLock<HashMap<String, String>>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field while building
    pub fn with_field(self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(id, value);
        self
    }

    /// Set or replace a field's value
    pub fn set(&self, id: impl Into<String>, value: impl Into<String>) {
        self.fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), value.into());
    }

    /// Remove a field, returning its last value
    pub fn remove(&self, id: &str) -> Option<String> {
        self.fields
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn get(&self, id: &str) -> Option<String> {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }
}

impl FieldLookup for FieldValues {
    fn field_value(&self, field_id: &str) -> Option<String> {
        self.get(field_id)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            fields: RwLock::new(fields),
        }
    }
}
