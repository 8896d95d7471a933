// Configuration validation

use crate::{ConfigError, Result};
use std::fmt::Display;

/// Trait for validating configuration
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Reusable checks for `Validate` implementations
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate that a number is within `min..=max`
    pub fn in_range<T: PartialOrd + Display>(value: T, min: T, max: T, field: &str) -> Result<()> {
        if value < min || value > max {
            return Err(ConfigError::ValidationError(format!(
                "{} must be between {} and {}, got {}",
                field, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate a lower bound
    pub fn at_least<T: PartialOrd + Display>(value: T, min: T, field: &str) -> Result<()> {
        if value < min {
            return Err(ConfigError::ValidationError(format!(
                "{} must be at least {}, got {}",
                field, min, value
            )));
        }
        Ok(())
    }
}
