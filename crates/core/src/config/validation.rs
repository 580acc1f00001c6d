//! Configuration validation rules.
//!
//! Checks `AppConfig` values after they have been loaded from environment,
//! files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Longest accepted freshness floor (one year).
const MAX_MIN_FRESHNESS_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `min_freshness_secs` is 0 or longer than a year
    /// - `max_scale` is outside 1..=8
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.min_freshness_secs == 0 {
            return Err(invalid("min_freshness_secs", "must be at least 1 second"));
        }
        if self.min_freshness_secs > MAX_MIN_FRESHNESS_SECS {
            return Err(invalid("min_freshness_secs", "must not exceed one year"));
        }

        if !(1..=8).contains(&self.max_scale) {
            return Err(invalid("max_scale", "must be between 1 and 8"));
        }

        if self.allow_private_hosts {
            tracing::warn!("allow_private_hosts is set; origin fetches may reach internal addresses");
        }

        Ok(())
    }
}
