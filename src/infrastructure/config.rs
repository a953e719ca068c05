//! Configuration management
//!
//! Loads configuration from config.toml at startup.
//! Every section is optional and falls back to its defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// HTTP / WebSocket server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Observer fan-out settings
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Synthetic training-curve generator
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for ingest, stats and WebSocket endpoints
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to static dashboard assets
    #[serde(default = "default_static_path")]
    pub static_path: PathBuf,
}

/// Broker configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrokerConfig {
    /// Events buffered per observer before it is considered stalled and dropped
    #[serde(default = "default_queue_capacity")]
    pub observer_queue_capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for rolling log files
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,

    /// Filter directive, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Demo generator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Steps generated per model before the live tickers start
    #[serde(default = "default_backfill_steps")]
    pub backfill_steps: u64,

    /// Validation metrics are emitted every N steps
    #[serde(default = "default_validation_interval")]
    pub validation_interval: u64,

    #[serde(default = "default_demo_models")]
    pub models: Vec<DemoModel>,
}

/// One synthetic model
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DemoModel {
    pub name: String,
    /// Milliseconds between live steps
    pub rate_ms: u64,
    /// Noise offset; higher means a worse curve
    #[serde(default)]
    pub bias: f64,
    /// Noise offset for the backfilled history, `bias` when unset
    #[serde(default)]
    pub backfill_bias: Option<f64>,
}

impl DemoModel {
    pub fn backfill_bias(&self) -> f64 {
        self.backfill_bias.unwrap_or(self.bias)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_path: default_static_path(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            observer_queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backfill_steps: default_backfill_steps(),
            validation_interval: default_validation_interval(),
            models: default_demo_models(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8120
}

fn default_static_path() -> PathBuf {
    PathBuf::from("dist/assets")
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backfill_steps() -> u64 {
    7000
}

fn default_validation_interval() -> u64 {
    20
}

fn default_demo_models() -> Vec<DemoModel> {
    // modelD and modelE start from a neutral history and only improve live
    [
        ("modelA", 1500, 0.25, None),
        ("modelB", 2000, 0.1, None),
        ("modelC", 1800, -0.05, None),
        ("modelD", 1900, -0.20, Some(0.0)),
        ("modelE", 1850, -0.50, Some(0.0)),
    ]
    .into_iter()
    .map(|(name, rate_ms, bias, backfill_bias)| DemoModel {
        name: name.to_string(),
        rate_ms,
        bias,
        backfill_bias,
    })
    .collect()
}

impl Config {
    /// Load configuration from the file named by `CONFIG_PATH` (default config.toml)
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if file exists but cannot be read, parsed or validated.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File not found - use defaults
                Ok(Config::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker.observer_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "broker.observer_queue_capacity must be at least 1".into(),
            ));
        }
        for model in &self.demo.models {
            if model.name.is_empty() {
                return Err(ConfigError::Invalid("demo model name must not be empty".into()));
            }
            if model.rate_ms == 0 {
                return Err(ConfigError::Invalid(format!(
                    "demo model {} needs rate_ms > 0",
                    model.name
                )));
            }
        }
        Ok(())
    }

    /// `host:port` for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
