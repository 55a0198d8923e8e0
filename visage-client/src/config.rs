//! Configuration for the Visage analysis client
//!
//! Single-tier TOML bootstrap: the client keeps no local storage, so all
//! configuration is static for the lifetime of the session engine.
//!
//! # Settings Sources Priority
//!
//! 1. Programmatic overrides (from the embedding application)
//! 2. Environment variables (VISAGE_SERVICE_URL)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use visage_common::{Error, Result};

/// Environment variable overriding the classifier service base URL
pub const SERVICE_URL_ENV: &str = "VISAGE_SERVICE_URL";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. The embedding application
/// must rebuild the engine to pick up changes.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Base URL of the classifier service
    ///
    /// Default: `http://127.0.0.1:8000` (the service's standard local port)
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Total per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Largest accepted image selection in bytes
    ///
    /// Default: 10 MiB, matching the service's upload cap
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_service_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the classifier service, no trailing slash
    pub service_url: String,

    /// Total per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// Largest accepted image selection in bytes
    pub max_upload_bytes: usize,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and apply overrides
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed, or if
    /// the resolved service URL is empty.
    pub async fn load(toml_path: &PathBuf, overrides: ConfigOverrides) -> Result<Self> {
        let toml_str = tokio::fs::read_to_string(toml_path).await.map_err(|e| {
            Error::Config(format!("Failed to read config file {:?}: {}", toml_path, e))
        })?;

        let toml_config: TomlConfig = toml::from_str(&toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        info!("Loaded TOML configuration from {:?}", toml_path);

        Self::resolve(toml_config, overrides)
    }

    /// Resolve configuration from defaults plus overrides, without a file
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve(TomlConfig::default(), overrides)
    }

    /// Combine a parsed TOML config with the environment and overrides
    ///
    /// Priority: overrides > `VISAGE_SERVICE_URL` env > TOML > defaults.
    pub fn resolve(toml_config: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let service_url = overrides
            .service_url
            .or_else(|| std::env::var(SERVICE_URL_ENV).ok())
            .unwrap_or(toml_config.service_url);
        let service_url = service_url.trim_end_matches('/').to_string();
        if service_url.is_empty() {
            return Err(Error::Config("service_url must not be empty".to_string()));
        }

        Ok(Config {
            service_url,
            request_timeout_secs: overrides
                .request_timeout_secs
                .unwrap_or(toml_config.request_timeout_secs),
            connect_timeout_secs: overrides
                .connect_timeout_secs
                .unwrap_or(toml_config.connect_timeout_secs),
            max_upload_bytes: overrides
                .max_upload_bytes
                .unwrap_or(toml_config.max_upload_bytes),
            logging: toml_config.logging,
        })
    }

    /// Total per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Connection establishment timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for Config {
    /// Built-in defaults only; the environment is not consulted
    fn default() -> Self {
        Config {
            service_url: default_service_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Programmatic configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub service_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub max_upload_bytes: Option<usize>,
}
