//! Configuration management for Dalil.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DalilError, Result};
use crate::ratelimit::RateLimitConfig;

/// Prefix for environment overrides, e.g. `DALIL__FORM__ENDPOINT`.
const ENV_PREFIX: &str = "DALIL";

/// Main configuration for Dalil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DalilConfig {
    /// Contact form configuration
    #[serde(default)]
    pub form: FormConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,

    /// Persisted client state configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Algorithm catalog configuration
    #[serde(default)]
    pub content: ContentConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Contact form configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Endpoint receiving the urlencoded POST
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Value of the `form-name` discriminator field
    #[serde(default = "default_form_name")]
    pub form_name: String,

    /// Delay before a success message is cleared
    #[serde(default = "default_success_clear_ms")]
    pub success_clear_ms: u64,

    /// Delay before the form fields are reset after a success
    #[serde(default = "default_reset_delay_ms")]
    pub reset_delay_ms: u64,

    /// Delay before an error message is cleared
    #[serde(default = "default_error_clear_ms")]
    pub error_clear_ms: u64,

    /// Delay before a remaining-quota message is cleared
    #[serde(default = "default_info_clear_ms")]
    pub info_clear_ms: u64,

    /// Countdown re-render interval while rate limited
    #[serde(default = "default_countdown_tick_ms")]
    pub countdown_tick_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            form_name: default_form_name(),
            success_clear_ms: default_success_clear_ms(),
            reset_delay_ms: default_reset_delay_ms(),
            error_clear_ms: default_error_clear_ms(),
            info_clear_ms: default_info_clear_ms(),
            countdown_tick_ms: default_countdown_tick_ms(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8888/".to_string()
}

fn default_form_name() -> String {
    "contact".to_string()
}

fn default_success_clear_ms() -> u64 {
    5000
}

fn default_reset_delay_ms() -> u64 {
    2000
}

fn default_error_clear_ms() -> u64 {
    5000
}

fn default_info_clear_ms() -> u64 {
    3000
}

fn default_countdown_tick_ms() -> u64 {
    1000
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Maximum submissions allowed inside the window
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,

    /// Sliding window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// How long submission records are kept in storage
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Interval of the storage hygiene sweep
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            max_messages: default_max_messages(),
            window_secs: default_window_secs(),
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_max_messages() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    600
}

fn default_retention_secs() -> u64 {
    86400
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

impl RateLimitingConfig {
    /// The policy parameters derived from this section.
    pub fn policy(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_messages: self.max_messages,
            window: Duration::from_secs(self.window_secs),
        }
    }

    /// Get how long submission records are kept.
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// Get the interval between storage sweeps.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Persisted client state configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File holding the key/value store
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("dalil-storage.json")
}

/// Algorithm catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Local path or http(s) URL of the algorithms JSON document
    #[serde(default = "default_data_source")]
    pub data_source: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            data_source: default_data_source(),
        }
    }
}

fn default_data_source() -> String {
    "assets/data/algorithms.json".to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DalilConfig {
    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| DalilError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an optional file layered under `DALIL__*`
    /// environment overrides.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(true));
        }
        let config = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| DalilError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would disable rate limiting or drive a timer
    /// with a zero period.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.rate_limiting;
        let checks = [
            ("rate_limiting.max_messages", limits.max_messages as u64),
            ("rate_limiting.window_secs", limits.window_secs),
            ("rate_limiting.retention_secs", limits.retention_secs),
            ("rate_limiting.sweep_interval_secs", limits.sweep_interval_secs),
            ("form.countdown_tick_ms", self.form.countdown_tick_ms),
        ];

        for (name, value) in checks {
            if value == 0 {
                return Err(DalilError::Config(format!("{} must be greater than zero", name)));
            }
        }
        Ok(())
    }
}
