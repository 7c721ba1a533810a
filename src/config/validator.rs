//! Startup validation of the configuration

use super::loader::{ChainConfig, Config, ConfigError, LoggingConfig, PollingConfig, TargetConfig};
use crate::memory::FieldSpec;
use std::collections::HashSet;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_target(&config.target)?;
        Self::validate_chain(&config.chain)?;
        Self::validate_fields(&config.fields)?;
        Self::validate_polling(&config.polling)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    fn validate_target(target: &TargetConfig) -> Result<(), ConfigError> {
        for (key, value) in [
            ("window_class", &target.window_class),
            ("window_title", &target.window_title),
            ("module", &target.module),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("target.{key} cannot be empty")));
            }
        }
        Ok(())
    }

    fn validate_chain(chain: &ChainConfig) -> Result<(), ConfigError> {
        if chain.offsets.is_empty() {
            return Err(ConfigError::Invalid(
                "chain.offsets needs at least one offset".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_fields(fields: &[FieldSpec]) -> Result<(), ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one [[fields]] entry is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for field in fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::Invalid("field name cannot be empty".to_string()));
            }
            if !names.insert(field.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate field name: {}",
                    field.name
                )));
            }
        }
        Ok(())
    }

    fn validate_polling(polling: &PollingConfig) -> Result<(), ConfigError> {
        if polling.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "polling.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if polling.stale_after == 0 {
            return Err(ConfigError::Invalid(
                "polling.stale_after must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }
        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_message(config: &Config) -> String {
        match validate_config(config) {
            Err(ConfigError::Invalid(message)) => message,
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_identity() {
        let mut config = Config::default();
        config.target.module = "  ".to_string();
        assert!(invalid_message(&config).contains("target.module"));
    }

    #[test]
    fn test_empty_chain() {
        let mut config = Config::default();
        config.chain.offsets.clear();
        assert!(invalid_message(&config).contains("chain.offsets"));
    }

    #[test]
    fn test_fields() {
        let mut config = Config::default();
        config.fields.clear();
        assert!(invalid_message(&config).contains("[[fields]]"));

        config.fields = vec![FieldSpec::i32("hp", 0x4), FieldSpec::i32("hp", 0x8)];
        assert!(invalid_message(&config).contains("duplicate"));
    }

    #[test]
    fn test_polling() {
        let mut config = Config::default();
        config.polling.poll_interval_ms = 0;
        assert!(invalid_message(&config).contains("poll_interval_ms"));

        let mut config = Config::default();
        config.polling.stale_after = 0;
        assert!(invalid_message(&config).contains("stale_after"));
    }

    #[test]
    fn test_log_level() {
        let mut config = Config::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());

        config.logging.level = "verbose".to_string();
        assert!(invalid_message(&config).contains("verbose"));
    }
}
