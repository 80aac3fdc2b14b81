//! Configuration management.
//!
//! Settings come from a TOML file layered with `LIKEMINDED_*` environment
//! variables (double underscore separates section and key):
//!
//! ```toml
//! [api]
//! api_key = "your-api-key"
//! base_url = "http://v1.api.likeminded.exygy.com"
//! search_path = "/search/"
//!
//! [http]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ```bash
//! export LIKEMINDED_API__API_KEY="your-api-key"
//! export LIKEMINDED_HTTP__TIMEOUT_SECS=60
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::DEFAULT_SEARCH_PATH;
use crate::utils::DEFAULT_BASE_URL;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "LIKEMINDED";

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "likeminded.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// API endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API endpoint and credentials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key attached to every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// Root of the search service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Search endpoint path, relative to `base_url`
    #[serde(default = "default_search_path")]
    pub search_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("LIKEMINDED_API_KEY").ok(),
            base_url: default_base_url(),
            search_path: default_search_path(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_search_path() -> String {
    DEFAULT_SEARCH_PATH.to_string()
}

/// HTTP client settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    /// Effective user agent
    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(|| {
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
        })
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
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
    /// Write the configuration as pretty TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigFileError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigFileError::Io(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| ConfigFileError::Io(e.to_string()))
    }
}

/// Configuration file errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialize error: {0}")]
    Serialize(String),
}

/// Load configuration from a file, with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    if config.api.api_key.is_none() {
        config.api.api_key = std::env::var("LIKEMINDED_API_KEY").ok();
    }
    Ok(config)
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    Config::default()
}

/// Default location of the user config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("likeminded").join("config.toml"))
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    default_config_path().filter(|path| path.is_file())
}
