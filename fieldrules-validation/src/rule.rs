// Rule callables and caller-supplied rule sets

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type UnaryFn = dyn Fn(&Value) -> bool + Send + Sync;
type BinaryFn = dyn Fn(&Value, Option<&Value>) -> bool + Send + Sync;

/// Callable taking positional arguments, for hosts that cannot express a
/// rule's arity in its type (scripting bridges, rules loaded from data).
pub type DynamicFn = dyn Fn(&[Value]) -> bool + Send + Sync;

/// A named boolean predicate over a value and an optional parameter.
///
/// The arity is fixed by the constructor: [`Rule::unary`] rules never see the
/// parameter, [`Rule::binary`] rules receive it as `Option<&Value>`.
#[derive(Clone)]
pub struct Rule {
    kind: RuleKind,
}

#[derive(Clone)]
enum RuleKind {
    Unary(Arc<UnaryFn>),
    Binary(Arc<BinaryFn>),
}

impl Rule {
    pub fn unary<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: RuleKind::Unary(Arc::new(predicate)),
        }
    }

    pub fn binary<F>(predicate: F) -> Self
    where
        F: Fn(&Value, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: RuleKind::Binary(Arc::new(predicate)),
        }
    }

    /// Number of formal parameters, 1 or 2
    pub fn arity(&self) -> usize {
        match self.kind {
            RuleKind::Unary(_) => 1,
            RuleKind::Binary(_) => 2,
        }
    }

    /// Evaluate the rule
    pub fn check(&self, value: &Value, param: Option<&Value>) -> bool {
        match &self.kind {
            RuleKind::Unary(f) => f(value),
            RuleKind::Binary(f) => f(value, param),
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("arity", &self.arity()).finish()
    }
}

/// An entry of a [`RuleSet`] before the registrar has accepted it.
#[derive(Clone)]
pub enum RuleCandidate {
    /// A typed rule; always acceptable
    Rule(Rule),
    /// A positional callable declaring `arity` formal parameters
    Dynamic { arity: usize, func: Arc<DynamicFn> },
    /// A non-callable value
    Opaque(Value),
}

impl RuleCandidate {
    /// Declared parameter count, `None` for non-callables
    pub fn arity(&self) -> Option<usize> {
        match self {
            RuleCandidate::Rule(rule) => Some(rule.arity()),
            RuleCandidate::Dynamic { arity, .. } => Some(*arity),
            RuleCandidate::Opaque(_) => None,
        }
    }
}

impl From<Rule> for RuleCandidate {
    fn from(rule: Rule) -> Self {
        RuleCandidate::Rule(rule)
    }
}

impl fmt::Debug for RuleCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCandidate::Rule(rule) => f.debug_tuple("Rule").field(rule).finish(),
            RuleCandidate::Dynamic { arity, .. } => {
                f.debug_struct("Dynamic").field("arity", arity).finish()
            }
            RuleCandidate::Opaque(value) => f.debug_tuple("Opaque").field(value).finish(),
        }
    }
}

/// Adapt a positional callable to the rule calling convention.
///
/// The callable receives `value`, then the parameter (`null` when omitted),
/// truncated to its declared arity. Callables declaring at most one
/// parameter become unary rules.
pub(crate) fn adapt_dynamic(arity: usize, func: Arc<DynamicFn>) -> Rule {
    if arity <= 1 {
        return Rule::unary(move |value| {
            let args: Vec<Value> = std::iter::once(value).take(arity).cloned().collect();
            func(&args)
        });
    }

    Rule::binary(move |value, param| {
        let null = Value::Null;
        func(&[value.clone(), param.unwrap_or(&null).clone()])
    })
}

/// Ordered collection of named rule candidates, merged in insertion order.
///
/// ```
/// use fieldrules_validation::{Rule, RuleSet};
/// use serde_json::json;
///
/// let set = RuleSet::new()
///     .rule("even", Rule::unary(|v| v.as_i64().is_some_and(|n| n % 2 == 0)))
///     .value("broken", json!("not a function"));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    entries: Vec<(String, RuleCandidate)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed rule
    pub fn rule(self, name: impl Into<String>, rule: Rule) -> Self {
        self.candidate(name, RuleCandidate::Rule(rule))
    }

    /// Add a positional callable declaring `arity` parameters
    pub fn dynamic<F>(self, name: impl Into<String>, arity: usize, func: F) -> Self
    where
        F: Fn(&[Value]) -> bool + Send + Sync + 'static,
    {
        self.candidate(
            name,
            RuleCandidate::Dynamic {
                arity,
                func: Arc::new(func),
            },
        )
    }

    /// Add a non-callable entry
    pub fn value(self, name: impl Into<String>, value: Value) -> Self {
        self.candidate(name, RuleCandidate::Opaque(value))
    }

    pub fn candidate(mut self, name: impl Into<String>, candidate: RuleCandidate) -> Self {
        self.entries.push((name.into(), candidate));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl IntoIterator for RuleSet {
    type Item = (String, RuleCandidate);
    type IntoIter = std::vec::IntoIter<(String, RuleCandidate)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<N: Into<String>> FromIterator<(N, RuleCandidate)> for RuleSet {
    fn from_iter<I: IntoIterator<Item = (N, RuleCandidate)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, candidate)| (name.into(), candidate))
                .collect(),
        }
    }
}
