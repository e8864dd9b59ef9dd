//! Configuration validation rules.
//!
//! Misconfiguration is fatal at construction time: a run never starts with
//! a zero-capacity cache, a zero-width concurrency limit, or malformed
//! criteria.

use thiserror::Error;

use crate::config::AppConfig;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_capacity`, `max_concurrency` or `max_attempts` is 0
    /// - `timeout_ms` is below 100ms or above 5 minutes
    /// - the jitter or backoff window is inverted
    /// - `user_agent` or `board_url` is empty
    /// - any criterion is malformed
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(invalid("cache_capacity", "must be greater than 0"));
        }

        if self.max_concurrency == 0 {
            return Err(invalid("max_concurrency", "must be greater than 0"));
        }

        if self.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than 0"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.jitter_min_ms > self.jitter_max_ms {
            return Err(invalid("jitter_min_ms", "must not exceed jitter_max_ms"));
        }

        if self.backoff_base_ms > self.backoff_max_ms {
            return Err(invalid("backoff_base_ms", "must not exceed backoff_max_ms"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.board_url.is_empty() {
            return Err(invalid("board_url", "must not be empty"));
        }

        for criterion in &self.criteria {
            criterion
                .validate()
                .map_err(|e| invalid("criteria", &e.to_string()))?;
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{Criteria, Rule};

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_cache_capacity() {
        let config = AppConfig { cache_capacity: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_capacity"));
    }

    #[test]
    fn test_validate_zero_concurrency() {
        let config = AppConfig { max_concurrency: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_concurrency"));
    }

    #[test]
    fn test_validate_zero_attempts() {
        let config = AppConfig { max_attempts: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_attempts"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(config.validate().is_err());

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_inverted_jitter_window() {
        let config = AppConfig { jitter_min_ms: 5_000, jitter_max_ms: 1_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "jitter_min_ms"));
    }

    #[test]
    fn test_validate_inverted_backoff_window() {
        let config = AppConfig { backoff_base_ms: 10_000, backoff_max_ms: 8_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "backoff_base_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_malformed_criteria() {
        let config = AppConfig {
            criteria: vec![Criteria::Tech { keywords: vec![], rule: Rule::All }],
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "criteria"));
    }
}
