//! Application configuration with layered loading.
//!
//! Sources, highest precedence first:
//!
//! 1. Environment variables (OGP_CACHE_*)
//! 2. TOML config file (if OGP_CACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::FreshnessPolicy;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via OGP_CACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for origin requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read from an origin response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Origin request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Freshness floor in seconds. Shorter advertised lifetimes are raised to this.
    ///
    /// Set via OGP_CACHE_MIN_FRESHNESS_SECS environment variable.
    #[serde(default = "default_min_freshness_secs")]
    pub min_freshness_secs: u64,

    /// Allow fetching from loopback/private addresses.
    #[serde(default)]
    pub allow_private_hosts: bool,

    /// Whether to launch the headless browser for card rendering.
    ///
    /// Set via OGP_CACHE_RENDER_ENABLED environment variable.
    #[serde(default)]
    pub render_enabled: bool,

    /// Largest accepted device-pixel scale for rendered cards.
    #[serde(default = "default_max_scale")]
    pub max_scale: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./ogp-cache.sqlite")
}

fn default_user_agent() -> String {
    "ogp-cache/0.1".into()
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_min_freshness_secs() -> u64 {
    3600
}

fn default_max_scale() -> u32 {
    4
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            min_freshness_secs: default_min_freshness_secs(),
            allow_private_hosts: false,
            render_enabled: false,
            max_scale: default_max_scale(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Freshness policy built from `min_freshness_secs`.
    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::from_secs(self.min_freshness_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OGP_CACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OGP_CACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
