//! Configuration for the LeetTrack system.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),
    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed for {field}: {reason}")]
    ValidationError { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub tracker: TrackerConfig,
    pub leetcode: LeetCodeConfig,
    pub openai: OpenAiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ".leettrack/leettrack.db".to_string(),
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}

/// Reconciliation loop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Seconds between sweeps. The sweep interval is the only retry mechanism
    /// for users whose processing failed.
    pub interval_secs: u64,
    /// How many most-recent accepted submissions to fetch per user. A user who
    /// submits more than this many accepted solutions between two sweeps can
    /// age a tracked completion out of the window; accepted limitation.
    pub lookback_limit: u32,
    /// Pause between users within one sweep, to respect upstream rate limits.
    pub user_pause_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            lookback_limit: 30,
            user_pause_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeetCodeConfig {
    pub graphql_url: String,
    pub timeout_secs: u64,
    /// Token-bucket capacity per minute for upstream requests.
    pub rate_limit_per_minute: u32,
}

impl Default for LeetCodeConfig {
    fn default() -> Self {
        Self {
            graphql_url: "https://leetcode.com/graphql/".to_string(),
            timeout_secs: 15,
            rate_limit_per_minute: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API key; empty means fall back to `LEETTRACK_OPENAI_API_KEY` /
    /// `OPENAI_API_KEY` at client construction.
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `leettrack.toml` from the working directory, falling back to
    /// defaults plus env overrides when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new("leettrack.toml");
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Config::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LEETTRACK_DATABASE_PATH") {
            self.database.path = val;
        }
        if let Ok(val) = std::env::var("LEETTRACK_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("LEETTRACK_LEETCODE_URL") {
            self.leetcode.graphql_url = val;
        }
        if let Ok(val) = std::env::var("LEETTRACK_OPENAI_API_KEY") {
            self.openai.api_key = val;
        }
        if let Ok(val) = std::env::var("LEETTRACK_TRACKER_INTERVAL_SECS") {
            if let Ok(v) = val.parse() {
                self.tracker.interval_secs = v;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.interval_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "tracker.interval_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.tracker.lookback_limit == 0 {
            return Err(ConfigError::ValidationError {
                field: "tracker.lookback_limit".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError {
                field: "database.max_connections".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn sample_toml() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tracker.interval_secs, 300);
        assert_eq!(config.tracker.lookback_limit, 30);
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = Config::default();
        config.tracker.interval_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [tracker]
            interval_secs = 60
            "#,
        )
        .expect("parse failed");
        assert_eq!(config.tracker.interval_secs, 60);
        assert_eq!(config.tracker.lookback_limit, 30);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn sample_round_trips() {
        let sample = Config::sample_toml();
        let parsed: Config = toml::from_str(&sample).expect("sample must parse");
        assert_eq!(parsed, Config::default());
    }
}
