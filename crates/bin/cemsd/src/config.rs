//! Configuration loading — TOML file with environment variable overrides.
//!
//! Reads `cems.toml` from the working directory. Portal coordinates,
//! credentials, and the device table have no sensible defaults, so the file
//! is mandatory; scheduling and storage sections are optional. Environment
//! variables take precedence over file values.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use cems_adapter_login_webdriver::LoginConfig;
use cems_adapter_portal_http::PortalConfig;
use cems_app::services::engine::EngineConfig;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Token cache settings.
    #[serde(default)]
    pub token_cache: TokenCacheConfig,
    /// Portal query endpoint settings.
    pub portal: PortalConfig,
    /// Browser login settings.
    pub login: LoginConfig,
    /// Engine scheduling knobs.
    #[serde(default)]
    pub engine: EngineSection,
    /// Monitored devices: logical name to portal port identifier.
    pub devices: BTreeMap<String, String>,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Token cache file configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TokenCacheConfig {
    /// Where the cached token document lives.
    pub path: PathBuf,
}

/// Engine scheduling knobs, all optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    /// Hours of history to backfill for a device with no stored data.
    pub backfill_hours: i64,
    /// Width of the self-healing scan window, in hours.
    pub heal_window_hours: i64,
    /// Width of the batched minute-sync window, in hours.
    pub minute_window_hours: i64,
    /// Minimum seconds between minute syncs.
    pub minute_sync_interval_secs: u64,
    /// Lower bound of the randomized idle sleep, in seconds.
    pub idle_min_secs: u64,
    /// Upper bound of the randomized idle sleep, in seconds.
    pub idle_max_secs: u64,
}

impl Config {
    /// Load configuration from `cems.toml` and apply environment-variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error when the file is absent, malformed, or fails
    /// semantic validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("cems.toml")
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ConfigError::Missing(path.to_string())
            } else {
                ConfigError::Io(err)
            }
        })?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CEMS_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("CEMS_TOKEN_CACHE") {
            self.token_cache.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CEMS_USERNAME") {
            self.login.username = val;
        }
        if let Ok(val) = std::env::var("CEMS_PASSWORD") {
            self.login.password = val;
        }
        if let Ok(val) = std::env::var("CEMS_WEBDRIVER_URL") {
            self.login.webdriver_url = val;
        }
        if let Ok(val) = std::env::var("CEMS_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::Validation(
                "at least one device must be configured".to_string(),
            ));
        }
        if self.login.username.trim().is_empty() || self.login.password.trim().is_empty() {
            return Err(ConfigError::Validation(
                "portal credentials must be set (file or CEMS_USERNAME/CEMS_PASSWORD)".to_string(),
            ));
        }
        let engine = &self.engine;
        if engine.backfill_hours <= 0 || engine.heal_window_hours <= 0 {
            return Err(ConfigError::Validation(
                "backfill and heal windows must be positive".to_string(),
            ));
        }
        if engine.idle_min_secs > engine.idle_max_secs {
            return Err(ConfigError::Validation(
                "idle_min_secs must not exceed idle_max_secs".to_string(),
            ));
        }
        Ok(())
    }

    /// Device table as `(name, port_id)` pairs, in name order.
    pub fn device_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.devices
            .iter()
            .map(|(name, port)| (name.clone(), port.clone()))
    }
}

impl EngineSection {
    /// Translate the section into the engine's own config type.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            backfill_hours: self.backfill_hours,
            heal_window_hours: self.heal_window_hours,
            minute_window_hours: self.minute_window_hours,
            minute_sync_interval: Duration::from_secs(self.minute_sync_interval_secs),
            idle_secs: (self.idle_min_secs, self.idle_max_secs),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:cems.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "cemsd=info,cems_app=info,cems_adapter_login_webdriver=info,sqlx=warn"
                .to_string(),
        }
    }
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cems-token.json"),
        }
    }
}

impl Default for EngineSection {
    fn default() -> Self {
        let defaults = EngineConfig::default();
        Self {
            backfill_hours: defaults.backfill_hours,
            heal_window_hours: defaults.heal_window_hours,
            minute_window_hours: defaults.minute_window_hours,
            minute_sync_interval_secs: defaults.minute_sync_interval.as_secs(),
            idle_min_secs: defaults.idle_secs.0,
            idle_max_secs: defaults.idle_secs.1,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file does not exist.
    #[error("config file not found: {0}")]
    Missing(String),
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
