// Rule table configuration

#[cfg(feature = "config")]
use fieldrules_config::{ConfigManager, ConfigValidator, Validate};
use serde::{Deserialize, Serialize};

/// Environment prefix read by [`RulesConfig::from_env`]
pub const ENV_PREFIX: &str = "FIELDRULES";

/// Limits applied to caller-supplied `regex` patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Compiled-size limit per pattern, in bytes
    pub pattern_size_limit: usize,
    /// Maximum group nesting depth of a pattern
    pub pattern_nest_limit: u32,
    /// Backtracking steps one match may take before it is abandoned
    pub pattern_backtrack_limit: usize,
    /// Number of compiled patterns kept for reuse; 0 disables the cache
    pub pattern_cache_capacity: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            pattern_size_limit: 256 * 1024,
            pattern_nest_limit: 64,
            pattern_backtrack_limit: 1_000_000,
            pattern_cache_capacity: 128,
        }
    }
}

#[cfg(feature = "config")]
impl RulesConfig {
    /// Read from a config manager, keeping defaults for absent keys
    pub fn from_manager(manager: &ConfigManager) -> fieldrules_config::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            pattern_size_limit: manager
                .get_optional("pattern_size_limit")?
                .unwrap_or(defaults.pattern_size_limit),
            pattern_nest_limit: manager
                .get_optional("pattern_nest_limit")?
                .unwrap_or(defaults.pattern_nest_limit),
            pattern_backtrack_limit: manager
                .get_optional("pattern_backtrack_limit")?
                .unwrap_or(defaults.pattern_backtrack_limit),
            pattern_cache_capacity: manager
                .get_optional("pattern_cache_capacity")?
                .unwrap_or(defaults.pattern_cache_capacity),
        };
        config.validate()?;
        Ok(config)
    }

    /// Read `FIELDRULES_*` environment variables
    pub fn from_env() -> fieldrules_config::Result<Self> {
        let manager = ConfigManager::with_prefix(ENV_PREFIX);
        manager.load_env()?;
        Self::from_manager(&manager)
    }
}

#[cfg(feature = "config")]
impl Validate for RulesConfig {
    fn validate(&self) -> fieldrules_config::Result<()> {
        ConfigValidator::at_least(self.pattern_size_limit, 1024, "pattern_size_limit")?;
        ConfigValidator::in_range(self.pattern_nest_limit, 1, 1024, "pattern_nest_limit")?;
        ConfigValidator::at_least(self.pattern_backtrack_limit, 1, "pattern_backtrack_limit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial() {
        let config: RulesConfig = serde_json::from_str(r#"{"pattern_nest_limit": 8}"#).unwrap();
        assert_eq!(config.pattern_nest_limit, 8);
        assert_eq!(config.pattern_cache_capacity, 128);
        assert_eq!(config.pattern_backtrack_limit, 1_000_000);
    }

    #[cfg(feature = "config")]
    mod manager {
        use super::*;

        #[test]
        fn test_defaults_are_valid() {
            assert!(RulesConfig::default().validate().is_ok());
        }

        #[test]
        fn test_from_manager_overrides() {
            let manager = ConfigManager::new();
            manager.set("pattern_cache_capacity", "0").unwrap();
            manager.set("pattern_nest_limit", 16).unwrap();
            manager.set("pattern_backtrack_limit", 5000).unwrap();

            let config = RulesConfig::from_manager(&manager).unwrap();
            assert_eq!(config.pattern_cache_capacity, 0);
            assert_eq!(config.pattern_nest_limit, 16);
            assert_eq!(config.pattern_backtrack_limit, 5000);
            assert_eq!(config.pattern_size_limit, 256 * 1024);
        }

        #[test]
        fn test_from_manager_rejects_tiny_size_limit() {
            let manager = ConfigManager::new();
            manager.set("pattern_size_limit", 10).unwrap();

            assert!(RulesConfig::from_manager(&manager).is_err());
        }

        #[test]
        fn test_from_manager_rejects_zero_backtrack_limit() {
            let manager = ConfigManager::new();
            manager.set("pattern_backtrack_limit", 0).unwrap();

            assert!(RulesConfig::from_manager(&manager).is_err());
        }
    }
}
