//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.stockwire/config.toml` (user)
//! 3. `/etc/stockwire/config.toml` (system)
//! 4. Built-in defaults
//!
//! Environment variables override file values:
//! - `STOCKWIRE_BACKEND_URL` (or legacy `BACKEND_URL`): news backend base URL
//! - `STOCKWIRE_PROVIDER_URL`: quote provider base URL
//! - `STOCKWIRE_LOG`: log level / filter

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::cache::CacheConfig;
use crate::providers::RetryConfig;
use crate::providers::yahoo;
use crate::{Result, StockwireError};

/// Stockwire configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub retry: RetrySection,
    #[serde(default)]
    pub pool: PoolSection,
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Quote cache settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheSection {
    /// Maximum cached tickers (default: 1000).
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    /// Entry lifetime in seconds, errors included (default: 60).
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> usize {
    1_000
}

fn default_cache_ttl() -> u64 {
    60
}

impl From<&CacheSection> for CacheConfig {
    fn from(section: &CacheSection) -> Self {
        CacheConfig::new()
            .capacity(section.capacity)
            .ttl(Duration::from_secs(section.ttl_secs))
    }
}

/// Retry settings for provider calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetrySection {
    /// Attempts including the first (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff in milliseconds (default: 500).
    #[serde(default = "default_backoff_ms")]
    pub backoff_factor_ms: u64,
    /// Cap on a single backoff in seconds (default: 30).
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_factor_ms: default_backoff_ms(),
            max_delay_secs: default_max_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_max_delay() -> u64 {
    30
}

impl From<&RetrySection> for RetryConfig {
    fn from(section: &RetrySection) -> Self {
        RetryConfig::new()
            .max_attempts(section.max_attempts)
            .backoff_factor(Duration::from_millis(section.backoff_factor_ms))
            .max_delay(Duration::from_secs(section.max_delay_secs))
    }
}

/// Worker pool settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PoolSection {
    /// Concurrent lookups across all batch calls (default: 10).
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

fn default_max_workers() -> usize {
    10
}

/// Quote provider settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSection {
    #[serde(default = "default_provider_url")]
    pub base_url: String,
    /// Per-attempt timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: default_provider_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_provider_url() -> String {
    yahoo::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    10
}

/// News backend settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackendSection {
    /// Base URL of the news backend; required for the news commands.
    #[serde(default)]
    pub url: Option<String>,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSection {
    /// `tracing` filter directive (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the standard locations, apply environment
    /// overrides and validate.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.stockwire/config.toml`
    /// 3. `/etc/stockwire/config.toml`
    /// 4. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => {
                debug!("no config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StockwireError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            StockwireError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(StockwireError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".stockwire").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/stockwire/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Override fields from environment variables looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("STOCKWIRE_BACKEND_URL").or_else(|| var("BACKEND_URL")) {
            self.backend.url = Some(url);
        }
        if let Some(url) = var("STOCKWIRE_PROVIDER_URL") {
            self.provider.base_url = url;
        }
        if let Some(level) = var("STOCKWIRE_LOG") {
            self.logging.level = level;
        }
    }

    /// Reject settings that would make the gateway unusable.
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(StockwireError::Configuration(
                "cache.capacity must be at least 1".into(),
            ));
        }
        if self.pool.max_workers == 0 {
            return Err(StockwireError::Configuration(
                "pool.max_workers must be at least 1".into(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(StockwireError::Configuration(
                "retry.max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }
}
