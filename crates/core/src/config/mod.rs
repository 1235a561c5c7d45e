//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PITWALL_*)
//! 2. TOML config file (if PITWALL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::bust::BUST_FLAG_FILE;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PITWALL_*)
/// 2. TOML config file (if PITWALL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL the timing data files are served under.
    ///
    /// Set via PITWALL_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path to SQLite cache database.
    ///
    /// Set via PITWALL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory holding session-scoped state such as the cache-bust flag.
    ///
    /// Set via PITWALL_SESSION_DIR environment variable.
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,

    /// Resource name of the driver catalog file.
    ///
    /// Set via PITWALL_DRIVER_INFO environment variable.
    #[serde(default = "default_driver_info")]
    pub driver_info: String,

    /// Resource names to load each session cycle, in order.
    ///
    /// Set via PITWALL_RESOURCES environment variable (comma-separated).
    #[serde(default)]
    pub resources: Vec<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PITWALL_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via PITWALL_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PITWALL_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/data/".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pitwall-cache.sqlite")
}

fn default_session_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_driver_info() -> String {
    "driver_info.csv".into()
}

fn default_user_agent() -> String {
    "pitwall/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            db_path: default_db_path(),
            session_dir: default_session_dir(),
            driver_info: default_driver_info(),
            resources: Vec::new(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Path of the cache-bust flag file inside the session directory.
    pub fn bust_flag_path(&self) -> PathBuf {
        self.session_dir.join(BUST_FLAG_FILE)
    }

    /// Base URL with a guaranteed trailing slash, ready for resource joins.
    pub fn base_url_normalized(&self) -> String {
        if self.base_url.ends_with('/') { self.base_url.clone() } else { format!("{}/", self.base_url) }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PITWALL_`
    /// 2. TOML file from `PITWALL_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PITWALL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PITWALL_")
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
        assert_eq!(config.base_url, "http://localhost:8080/data/");
        assert_eq!(config.db_path, PathBuf::from("./pitwall-cache.sqlite"));
        assert_eq!(config.session_dir, std::env::temp_dir());
        assert_eq!(config.driver_info, "driver_info.csv");
        assert!(config.resources.is_empty());
        assert_eq!(config.user_agent, "pitwall/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_bust_flag_path_joins_session_dir() {
        let config = AppConfig { session_dir: PathBuf::from("/var/run/pitwall"), ..Default::default() };
        assert_eq!(config.bust_flag_path(), PathBuf::from("/var/run/pitwall/f1_data_cache_bust"));
    }

    #[test]
    fn test_base_url_normalized_appends_slash() {
        let config = AppConfig { base_url: "http://example.com/data".into(), ..Default::default() };
        assert_eq!(config.base_url_normalized(), "http://example.com/data/");
    }

    #[test]
    fn test_base_url_normalized_keeps_existing_slash() {
        let config = AppConfig::default();
        assert_eq!(config.base_url_normalized(), "http://localhost:8080/data/");
    }
}
