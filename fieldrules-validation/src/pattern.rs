// Caller-supplied pattern compilation for the `regex` rule
//
// The `regex` rule compiles text handed to it at call time, e.g. `/^\d{5}$/i`.
// Whoever controls that text controls the pattern: feed it only from trusted
// rule definitions. Compilation is bounded by the `RulesConfig` size and
// nesting limits, and matching by its backtrack limit.
//
// Patterns are read in the browser dialect: lookaround and backreferences
// work, and `\d`, `\w` and `\b` only know ASCII digits and word characters.
// `\s` stays Unicode-aware, as it is in browsers.

use crate::config::RulesConfig;
use fancy_regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::debug;

const FLAG_CHARS: [char; 4] = ['g', '|', 'i', 'm'];
const MAX_FLAGS: usize = 3;

const WORD: &str = "0-9A-Za-z_";
const WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?![0-9A-Za-z_])|(?<![0-9A-Za-z_])(?=[0-9A-Za-z_]))";
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[0-9A-Za-z_])(?=[0-9A-Za-z_])|(?<![0-9A-Za-z_])(?![0-9A-Za-z_]))";
const META_CHARS: &str = "\\.+*?()|[]{}^$#&-~";

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid pattern flag '{0}'")]
    InvalidFlag(char),

    #[error("duplicate pattern flag '{0}'")]
    DuplicateFlag(char),

    #[error("pattern nests {depth} groups deep, limit is {limit}")]
    TooDeep { depth: u32, limit: u32 },

    #[error("pattern does not compile: {0}")]
    Compile(#[source] fancy_regex::Error),

    #[error("pattern gave up matching: {0}")]
    Execution(#[source] fancy_regex::Error),
}

/// A delimiter-wrapped pattern split into body and flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSpec {
    pub body: String,
    pub flags: String,
}

impl PatternSpec {
    /// Split `/body/flags` text.
    ///
    /// The flag suffix is the last (up to three) characters of the trailing
    /// run of `g`, `i`, `m` and `|`. The body is what precedes it, minus its
    /// first and last characters (the delimiters), whatever they are.
    pub fn parse(text: &str) -> Self {
        let run = text
            .chars()
            .rev()
            .take_while(|c| FLAG_CHARS.contains(c))
            .count()
            .min(MAX_FLAGS);
        // flag characters are ASCII, so the run is `run` bytes long
        let (rest, flags) = text.split_at(text.len() - run);

        let mut body = rest.chars();
        body.next();
        body.next_back();

        Self {
            body: body.as_str().to_string(),
            flags: flags.to_string(),
        }
    }

    fn check_flags(&self) -> Result<(), PatternError> {
        let mut seen = Vec::with_capacity(MAX_FLAGS);
        for flag in self.flags.chars() {
            if flag == '|' {
                return Err(PatternError::InvalidFlag(flag));
            }
            if seen.contains(&flag) {
                return Err(PatternError::DuplicateFlag(flag));
            }
            seen.push(flag);
        }
        Ok(())
    }

    /// Inline flag group for the `i` and `m` flags; `g` has no effect on a test
    fn inline_flags(&self) -> String {
        let flags: String = self.flags.chars().filter(|c| matches!(c, 'i' | 'm')).collect();
        if flags.is_empty() {
            flags
        } else {
            format!("(?{})", flags)
        }
    }
}

/// Rewrite a browser-dialect body for the engine, returning it with its
/// deepest group nesting.
fn translate(body: &str) -> (String, u32) {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    let mut in_class = false;
    let (mut depth, mut deepest) = (0u32, 0u32);

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('d') if in_class => out.push_str("0-9"),
                Some('w') if in_class => out.push_str(WORD),
                Some('b') if in_class => out.push_str("\\x08"),
                Some('d') => out.push_str("[0-9]"),
                Some('D') => out.push_str("[^0-9]"),
                Some('w') => out.push_str("[0-9A-Za-z_]"),
                Some('W') => out.push_str("[^0-9A-Za-z_]"),
                Some('b') => out.push_str(WORD_BOUNDARY),
                Some('B') => out.push_str(NOT_WORD_BOUNDARY),
                // identity escapes such as `\/` are plain characters
                Some(p) if p.is_ascii_punctuation() && !META_CHARS.contains(p) => out.push(p),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '[' if !in_class => {
                in_class = true;
                out.push(c);
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '(' if !in_class => {
                depth += 1;
                deepest = deepest.max(depth);
                out.push(c);
            }
            ')' if !in_class => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    (out, deepest)
}

/// Compiles pattern specs under configured limits, reusing earlier results.
#[derive(Debug)]
pub struct PatternCompiler {
    size_limit: usize,
    nest_limit: u32,
    backtrack_limit: usize,
    capacity: usize,
    cache: Mutex<HashMap<PatternSpec, Regex>>,
}

impl PatternCompiler {
    pub fn new(config: &RulesConfig) -> Self {
        Self {
            size_limit: config.pattern_size_limit,
            nest_limit: config.pattern_nest_limit,
            backtrack_limit: config.pattern_backtrack_limit,
            capacity: config.pattern_cache_capacity,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn compile(&self, spec: &PatternSpec) -> Result<Regex, PatternError> {
        if let Some(regex) = self.lock().get(spec) {
            return Ok(regex.clone());
        }

        spec.check_flags()?;
        let (body, depth) = translate(&spec.body);
        if depth > self.nest_limit {
            return Err(PatternError::TooDeep {
                depth,
                limit: self.nest_limit,
            });
        }

        let regex = RegexBuilder::new(&format!("{}{}", spec.inline_flags(), body))
            .backtrack_limit(self.backtrack_limit)
            .delegate_size_limit(self.size_limit)
            .build()
            .map_err(PatternError::Compile)?;

        if self.capacity > 0 {
            let mut cache = self.lock();
            if cache.len() >= self.capacity {
                debug!("Pattern cache full ({} entries), clearing", cache.len());
                cache.clear();
            }
            cache.insert(spec.clone(), regex.clone());
        }

        Ok(regex)
    }

    /// Parse `pattern`, compile it and search `haystack`
    pub fn is_match(&self, pattern: &str, haystack: &str) -> Result<bool, PatternError> {
        let regex = self.compile(&PatternSpec::parse(pattern))?;
        regex.is_match(haystack).map_err(PatternError::Execution)
    }

    /// Number of cached patterns
    pub fn cached(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PatternSpec, Regex>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(&RulesConfig::default())
    }
}
