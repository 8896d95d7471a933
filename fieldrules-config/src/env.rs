// Environment variable loading

use crate::{ConfigError, Result};
use std::collections::HashMap;
use std::env;

/// Reads configuration keys from the process environment.
///
/// With a prefix such as `FIELDRULES`, only `FIELDRULES_*` variables are
/// visible and their keys are reported without the prefix, lower-cased
/// (`FIELDRULES_PATTERN_SIZE_LIMIT` becomes `pattern_size_limit`).
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching environment variables
    pub fn load(&self) -> Result<HashMap<String, String>> {
        let mut config = HashMap::new();

        for (key, value) in env::vars() {
            match self.strip_prefix(&key) {
                Some(trimmed) if !trimmed.is_empty() => {
                    config.insert(trimmed.to_lowercase(), value);
                }
                _ => {}
            }
        }

        Ok(config)
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.full_key(key)).map_err(ConfigError::EnvError)
    }

    fn full_key(&self, key: &str) -> String {
        match self.prefix {
            Some(ref prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }

    fn strip_prefix<'a>(&self, key: &'a str) -> Option<&'a str> {
        match self.prefix {
            Some(ref prefix) => key.strip_prefix(prefix.as_str())?.strip_prefix('_'),
            None => Some(key),
        }
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
