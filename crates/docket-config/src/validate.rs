//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Longest accepted audit write timeout (10 minutes).
const MAX_WRITE_TIMEOUT_MS: u64 = 600_000;

/// Most attempts allowed for one audit write.
const MAX_AUDIT_ATTEMPTS: u32 = 10;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_storage(config)?;
    validate_audit(config)?;
    validate_auth(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    let dir = config.storage.data_dir.trim();
    if !dir.is_empty() && !std::path::Path::new(dir).is_absolute() {
        return Err(invalid(
            "storage.data_dir",
            format!("'{dir}' must be an absolute path"),
        ));
    }
    Ok(())
}

fn validate_audit(config: &Config) -> ConfigResult<()> {
    let a = &config.audit;

    if a.write_timeout_ms == 0 || a.write_timeout_ms > MAX_WRITE_TIMEOUT_MS {
        return Err(invalid(
            "audit.write_timeout_ms",
            format!(
                "{} is out of range; must be between 1 and {MAX_WRITE_TIMEOUT_MS}",
                a.write_timeout_ms
            ),
        ));
    }

    if a.max_attempts == 0 || a.max_attempts > MAX_AUDIT_ATTEMPTS {
        return Err(invalid(
            "audit.max_attempts",
            format!(
                "{} is out of range; must be between 1 and {MAX_AUDIT_ATTEMPTS}",
                a.max_attempts
            ),
        ));
    }

    if a.retry_backoff_ms > a.write_timeout_ms {
        return Err(invalid(
            "audit.retry_backoff_ms",
            "must not exceed audit.write_timeout_ms",
        ));
    }

    Ok(())
}

fn validate_auth(config: &Config) -> ConfigResult<()> {
    if config.auth.max_password_bytes == 0 {
        return Err(invalid("auth.max_password_bytes", "must be greater than 0"));
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(invalid(
            "logging.level",
            format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        ));
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(result: ConfigResult<()>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_relative_data_dir() {
        let mut config = Config::default();
        config.storage.data_dir = "data".to_owned();
        assert_eq!(field_of(validate(&config)), "storage.data_dir");
    }

    #[test]
    fn test_audit_bounds() {
        let mut config = Config::default();
        config.audit.write_timeout_ms = 0;
        assert_eq!(field_of(validate(&config)), "audit.write_timeout_ms");

        let mut config = Config::default();
        config.audit.max_attempts = 0;
        assert_eq!(field_of(validate(&config)), "audit.max_attempts");

        let mut config = Config::default();
        config.audit.retry_backoff_ms = 10_000;
        assert_eq!(field_of(validate(&config)), "audit.retry_backoff_ms");
    }

    #[test]
    fn test_zero_password_limit() {
        let mut config = Config::default();
        config.auth.max_password_bytes = 0;
        assert_eq!(field_of(validate(&config)), "auth.max_password_bytes");
    }

    #[test]
    fn test_logging_values() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.level");

        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert_eq!(field_of(validate(&config)), "logging.format");
    }
}
