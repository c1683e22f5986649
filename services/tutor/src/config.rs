//! services/tutor/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    /// Simulated latency of the document analyzer.
    pub analysis_delay: Duration,
    /// Simulated latency of the response generator.
    pub reply_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let analysis_delay = delay_from_env("ANALYSIS_DELAY_MS", 1500)?;
        let reply_delay = delay_from_env("REPLY_DELAY_MS", 1500)?;

        Ok(Self {
            log_level,
            analysis_delay,
            reply_delay,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            log_level: Level::INFO,
            analysis_delay: Duration::ZERO,
            reply_delay: Duration::ZERO,
        }
    }
}

/// Reads a millisecond delay from the environment, falling back to a default.
fn delay_from_env(var: &str, default_ms: u64) -> Result<Duration, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|_| {
                ConfigError::InvalidValue(
                    var.to_string(),
                    format!("'{}' is not a number of milliseconds", raw),
                )
            }),
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}
