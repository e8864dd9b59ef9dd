//! Application configuration with layered loading.
//!
//! Configuration is assembled with figment from three layers:
//!
//! 1. Environment variables (JOBSIFT_*)
//! 2. TOML config file (if JOBSIFT_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! Criteria live in the config file, e.g.:
//!
//! ```toml
//! [[criteria]]
//! kind = "tech"
//! rule = "all"
//! keywords = [{ name = "Rust" }, { name = "Python" }]
//!
//! [[criteria]]
//! kind = "location"
//! rule = "at_least_one"
//! keywords = [{ form = "hybrid", city = "gdansk" }, { form = "remote" }]
//! ```

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::criteria::Criteria;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (JOBSIFT_*)
/// 2. TOML config file (if JOBSIFT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the job board.
    #[serde(default = "default_board_url")]
    pub board_url: String,

    /// Board language segment, e.g. "python" for the Python listings index.
    #[serde(default = "default_language")]
    pub language: String,

    /// Extra skills appended to the board index query (`skills=<Skill>`).
    #[serde(default)]
    pub skills: Vec<String>,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum simultaneous in-flight network calls.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Recency cache capacity in entries.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Total attempts per logical fetch, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// First retry backoff in milliseconds; doubles per attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Backoff growth cap in milliseconds.
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    /// Lower bound of the pre-request jitter window in milliseconds.
    #[serde(default = "default_jitter_min_ms")]
    pub jitter_min_ms: u64,

    /// Upper bound of the pre-request jitter window in milliseconds.
    #[serde(default = "default_jitter_max_ms")]
    pub jitter_max_ms: u64,

    /// Filtering criteria; an empty list matches every offer.
    #[serde(default)]
    pub criteria: Vec<Criteria>,
}

fn default_board_url() -> String {
    "https://justjoin.it".into()
}

fn default_language() -> String {
    "python".into()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:132.0) Gecko/20100101 Firefox/132.0".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_concurrency() -> usize {
    3
}

fn default_cache_capacity() -> usize {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    2_000
}

fn default_backoff_max_ms() -> u64 {
    8_000
}

fn default_jitter_min_ms() -> u64 {
    1_000
}

fn default_jitter_max_ms() -> u64 {
    3_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            board_url: default_board_url(),
            language: default_language(),
            skills: Vec::new(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_concurrency: default_max_concurrency(),
            cache_capacity: default_cache_capacity(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            jitter_min_ms: default_jitter_min_ms(),
            jitter_max_ms: default_jitter_max_ms(),
            criteria: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("JOBSIFT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("JOBSIFT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.board_url, "https://justjoin.it");
        assert_eq!(config.language, "python");
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.cache_capacity, 100);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.backoff_base_ms, 2_000);
        assert_eq!(config.backoff_max_ms, 8_000);
        assert_eq!(config.jitter_min_ms, 1_000);
        assert_eq!(config.jitter_max_ms, 3_000);
        assert!(config.skills.is_empty());
        assert!(config.criteria.is_empty());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_criteria_from_toml_fragment() {
        let toml = r#"
            [[criteria]]
            kind = "tech"
            rule = "all"
            keywords = [{ name = "Rust" }, { name = "Python" }]

            [[criteria]]
            kind = "location"
            rule = "at_least_one"
            keywords = [{ form = "hybrid", city = "gdansk" }, { form = "remote" }]
        "#;

        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();

        assert_eq!(config.criteria.len(), 2);
        assert!(config.validate().is_ok());
    }
}
