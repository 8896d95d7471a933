//! Configuration management for fieldrules
//!
//! Layers key/value configuration from environment variables, `.env` files
//! and JSON/TOML files into one flat map, then hands typed values or whole
//! validated structs back to callers.
//!
//! ```
//! use fieldrules_config::ConfigManager;
//!
//! let manager = ConfigManager::new();
//! manager.set("pattern_cache_capacity", 32).unwrap();
//!
//! let capacity: usize = manager.get("pattern_cache_capacity").unwrap();
//! assert_eq!(capacity, 32);
//! ```

pub mod env;
pub mod error;
pub mod loader;
pub mod validation;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use validation::{ConfigValidator, Validate};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Main configuration manager
#[derive(Clone, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<HashMap<String, Value>>>,
    env_prefix: Option<String>,
}

impl ConfigManager {
    /// Create a new configuration manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with environment variable prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            config: Arc::default(),
            env_prefix: Some(prefix.into()),
        }
    }

    /// Load configuration from environment variables
    pub fn load_env(&self) -> Result<()> {
        let loader = EnvLoader::new(self.env_prefix.clone());
        let env_vars = loader.load()?;
        debug!("Loaded {} configuration keys from environment", env_vars.len());

        let mut config = self.write();
        for (key, value) in env_vars {
            config.insert(key, Value::String(value));
        }

        Ok(())
    }

    /// Load configuration from a .env file, then from the environment
    pub fn load_dotenv(&self, path: Option<&Path>) -> Result<()> {
        if let Some(path) = path {
            dotenvy::from_path(path).map_err(|e| ConfigError::LoadError(e.to_string()))?;
        } else {
            dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
        }
        self.load_env()
    }

    /// Load configuration from file, detecting the format from its extension
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;
        let data = loader.load_file(path)?;
        debug!("Loaded configuration file {}", path.display());

        if let Value::Object(map) = data {
            let mut config = self.write();
            config.extend(map);
        }

        Ok(())
    }

    /// Set a configuration value
    pub fn set<T: serde::Serialize>(&self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;

        self.write().insert(key.to_string(), json_value);

        Ok(())
    }

    /// Get a configuration value
    ///
    /// Values that arrived as text (environment variables, `.env` files) are
    /// re-read as JSON when the requested type is not a string, so
    /// `FOO_LIMIT=64` can be fetched as a number.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ConfigError::KeyNotFound(key.to_string()))?;

        match serde_json::from_value::<T>(value.clone()) {
            Ok(typed) => Ok(typed),
            Err(err) => match value {
                Value::String(text) => serde_json::from_str(text.trim()).map_err(|_| {
                    ConfigError::DeserializationError {
                        key: key.to_string(),
                        message: err.to_string(),
                    }
                }),
                _ => Err(ConfigError::DeserializationError {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
            },
        }
    }

    /// Get a configuration value, `None` when the key is absent
    pub fn get_optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(ConfigError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Check if a key exists
    pub fn has(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Get all configuration keys
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Merge configuration from another manager
    pub fn merge(&self, other: &ConfigManager) -> Result<()> {
        let snapshot = other.read().clone();
        self.write().extend(snapshot);

        Ok(())
    }

    /// Load and validate configuration
    pub fn load_validated<T: DeserializeOwned + Validate>(&self) -> Result<T> {
        let json_value = Value::Object(
            self.read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );

        let validated: T =
            serde_json::from_value(json_value).map_err(|e| ConfigError::DeserializationError {
                key: "<root>".to_string(),
                message: e.to_string(),
            })?;

        validated.validate()?;

        Ok(validated)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.config.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.config.write().unwrap_or_else(PoisonError::into_inner)
    }
}
