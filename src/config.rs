//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! Push-service identity values are injected at deploy time; when absent
//! they fall back to placeholder strings so a build without secrets still
//! starts (the push receiver simply shows placeholder identity).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub realtime: RealtimeConfig,

    #[serde(default)]
    pub push: PushConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST API client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Realtime transport configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Base URL of the realtime endpoint; the `/wss` sub-path is joined at
    /// connect time.
    #[serde(default = "default_realtime_url")]
    pub base_url: String,

    /// Fixed delay before the connection loop redials after a drop (ms)
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
}

fn default_realtime_url() -> String {
    "ws://localhost:8080".to_string()
}

fn default_reconnect_delay() -> u64 {
    5000
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            base_url: default_realtime_url(),
            reconnect_delay_ms: default_reconnect_delay(),
        }
    }
}

/// Push service identity configuration
///
/// All fields default to placeholders rather than failing when unset.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    #[serde(default = "default_push_placeholder")]
    pub api_key: String,

    #[serde(default = "default_push_placeholder")]
    pub auth_domain: String,

    #[serde(default = "default_push_placeholder")]
    pub project_id: String,

    #[serde(default = "default_push_placeholder")]
    pub sender_id: String,

    #[serde(default = "default_push_placeholder")]
    pub app_id: String,
}

fn default_push_placeholder() -> String {
    "placeholder".to_string()
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            api_key: default_push_placeholder(),
            auth_domain: default_push_placeholder(),
            project_id: default_push_placeholder(),
            sender_id: default_push_placeholder(),
            app_id: default_push_placeholder(),
        }
    }
}

impl PushConfig {
    /// True when every identity field still holds the placeholder value.
    pub fn is_placeholder(&self) -> bool {
        let placeholder = default_push_placeholder();
        [
            &self.api_key,
            &self.auth_domain,
            &self.project_id,
            &self.sender_id,
            &self.app_id,
        ]
        .iter()
        .all(|v| **v == placeholder)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("huddle").join("config.toml")),
            Some(PathBuf::from("/etc/huddle/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(url) = std::env::var("HUDDLE_API_URL") {
            self.api.base_url = url;
        }

        // Realtime overrides
        if let Ok(url) = std::env::var("HUDDLE_REALTIME_URL") {
            self.realtime.base_url = url;
        }
        if let Ok(delay) = std::env::var("HUDDLE_RECONNECT_DELAY_MS") {
            if let Ok(d) = delay.parse() {
                self.realtime.reconnect_delay_ms = d;
            }
        }

        // Push identity overrides
        if let Ok(key) = std::env::var("HUDDLE_PUSH_API_KEY") {
            self.push.api_key = key;
        }
        if let Ok(domain) = std::env::var("HUDDLE_PUSH_AUTH_DOMAIN") {
            self.push.auth_domain = domain;
        }
        if let Ok(project) = std::env::var("HUDDLE_PUSH_PROJECT_ID") {
            self.push.project_id = project;
        }
        if let Ok(sender) = std::env::var("HUDDLE_PUSH_SENDER_ID") {
            self.push.sender_id = sender;
        }
        if let Ok(app) = std::env::var("HUDDLE_PUSH_APP_ID") {
            self.push.app_id = app;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("HUDDLE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("HUDDLE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            realtime: RealtimeConfig::default(),
            push: PushConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Huddle Configuration
#
# Environment variables override these settings:
# - HUDDLE_API_URL
# - HUDDLE_REALTIME_URL
# - HUDDLE_RECONNECT_DELAY_MS
# - HUDDLE_PUSH_API_KEY / _AUTH_DOMAIN / _PROJECT_ID / _SENDER_ID / _APP_ID
# - HUDDLE_LOG_LEVEL
# - HUDDLE_LOG_FORMAT

[api]
# REST API base URL
base_url = "http://localhost:8080/api"

# Request timeout in seconds
request_timeout_secs = 30

[realtime]
# Realtime endpoint base URL (the /wss sub-path is appended)
base_url = "ws://localhost:8080"

# Fixed automatic-reconnect delay (ms)
reconnect_delay_ms = 5000

[push]
# Push service identity (injected at deploy time; placeholders are fine
# for local development)
api_key = "placeholder"
auth_domain = "placeholder"
project_id = "placeholder"
sender_id = "placeholder"
app_id = "placeholder"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/huddle/huddle.log"
"#
    .to_string()
}
