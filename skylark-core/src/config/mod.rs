//! Configuration management for Skylark
//!
//! Environment- and file-based configuration with defaults and validation.
//! Environment variables follow the pattern `SKYLARK_<SECTION>_<KEY>`.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

mod error;

pub use error::ConfigError;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Homeserver and federation configuration
    pub homeserver: HomeserverConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Homeserver and federation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeserverConfig {
    /// Base URL of the session's homeserver
    pub url: String,

    /// Identity server URL; the homeserver URL stands in when absent
    pub identity_server_url: Option<String>,

    /// Homeservers of the deployment, queried for the aggregated
    /// public-room directory
    pub known_homeservers: Vec<String>,

    /// Per-request timeout handed down to backends
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            homeserver: HomeserverConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HomeserverConfig {
    fn default() -> Self {
        Self {
            url: "https://chat.skylark.example".to_string(),
            identity_server_url: None,
            known_homeservers: vec!["chat.skylark.example".to_string()],
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl HomeserverConfig {
    /// Host of the identity server the session should use, falling back to
    /// the homeserver itself when no identity server is configured
    pub fn identity_server_host(&self) -> Option<String> {
        let raw = self.identity_server_url.as_deref().unwrap_or(&self.url);
        host_of(raw)
    }
}

/// Extract the host portion of a URL-ish string
fn host_of(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', ':']).next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Example: `SKYLARK_HOMESERVER_URL=https://chat.example.org`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(url) = env::var("SKYLARK_HOMESERVER_URL") {
            config.homeserver.url = url;
        }
        if let Ok(url) = env::var("SKYLARK_IDENTITY_SERVER_URL") {
            config.homeserver.identity_server_url = Some(url);
        }
        if let Ok(servers) = env::var("SKYLARK_KNOWN_HOMESERVERS") {
            config.homeserver.known_homeservers = servers
                .split(',')
                .map(|server| server.trim().to_string())
                .filter(|server| !server.is_empty())
                .collect();
        }
        if let Ok(timeout) = env::var("SKYLARK_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid request timeout: {}", e)))?;
            config.homeserver.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(level) = env::var("SKYLARK_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("SKYLARK_LOG_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.homeserver.url.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "homeserver URL must not be empty".to_string(),
            ));
        }
        if self.homeserver.identity_server_host().is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "no identity server host resolvable from '{}'",
                self.homeserver.url
            )));
        }
        if self.homeserver.known_homeservers.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one known homeserver is required".to_string(),
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            return Err(ConfigError::InvalidValue(format!(
                "unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}
