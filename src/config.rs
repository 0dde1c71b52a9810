//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::document::VisibilityOptions;
use crate::reveal::RevealOptions;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub counter: CounterConfig,

    #[serde(default)]
    pub reveal: RevealConfig,

    #[serde(default)]
    pub preferences: PreferencesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Job board API location
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Site origin; empty means same-origin relative requests
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_categories_path")]
    pub categories_path: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_categories_path() -> String {
    crate::categories::CATEGORIES_PATH.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            categories_path: default_categories_path(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Full URL of the categories endpoint
    pub fn categories_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.categories_path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Category refresh polling
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_enabled")]
    pub enabled: bool,

    #[serde(default = "default_refresh_interval")]
    pub interval_ms: u64,
}

fn default_refresh_enabled() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    30_000 // 30 seconds
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: default_refresh_enabled(),
            interval_ms: default_refresh_interval(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

/// Stat counter animation
#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    #[serde(default = "default_counter_tick")]
    pub tick_ms: u64,

    #[serde(default = "default_counter_steps")]
    pub steps: u32,
}

fn default_counter_tick() -> u64 {
    20
}

fn default_counter_steps() -> u32 {
    50
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_counter_tick(),
            steps: default_counter_steps(),
        }
    }
}

impl CounterConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Reveal-on-scroll animation
#[derive(Debug, Clone, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f64,

    #[serde(default = "default_root_margin")]
    pub root_margin: String,

    #[serde(default = "default_offset_px")]
    pub offset_px: u32,

    #[serde(default = "default_transition")]
    pub transition: String,
}

fn default_reveal_threshold() -> f64 {
    0.1
}

fn default_root_margin() -> String {
    "0px 0px -50px 0px".to_string()
}

fn default_offset_px() -> u32 {
    20
}

fn default_transition() -> String {
    "all 0.6s ease".to_string()
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: default_reveal_threshold(),
            root_margin: default_root_margin(),
            offset_px: default_offset_px(),
            transition: default_transition(),
        }
    }
}

impl RevealConfig {
    pub fn options(&self) -> RevealOptions {
        RevealOptions {
            observer: VisibilityOptions {
                threshold: self.threshold.clamp(0.0, 1.0),
                root_margin: self.root_margin.clone(),
            },
            offset_px: self.offset_px,
            transition: self.transition.clone(),
        }
    }
}

/// Where native runs keep the theme preference
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesConfig {
    pub path: Option<String>,
}

impl PreferencesConfig {
    /// Configured path, else `<config_dir>/jobboard/preferences.json`
    pub fn store_path(&self) -> Option<PathBuf> {
        self.path
            .as_ref()
            .map(PathBuf::from)
            .or_else(crate::preferences::FileStore::default_path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
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

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
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
            dirs::config_dir().map(|p| p.join("jobboard").join("config.toml")),
            Some(PathBuf::from("/etc/jobboard/config.toml")),
            Some(PathBuf::from("./jobboard.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("JOBBOARD_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(interval) = std::env::var("JOBBOARD_REFRESH_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                self.refresh.interval_ms = ms;
            }
        }
        if let Ok(level) = std::env::var("JOBBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("JOBBOARD_LOG_FORMAT") {
            self.logging.format = format;
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
    r#"# Job board page enhancement configuration
#
# Environment variables override these settings:
# - JOBBOARD_API_URL
# - JOBBOARD_REFRESH_INTERVAL_MS
# - JOBBOARD_LOG_LEVEL
# - JOBBOARD_LOG_FORMAT

[api]
# Site origin; leave empty in the browser to use same-origin requests
base_url = "http://localhost:8000"

# Categories endpoint path
categories_path = "/api/categories/"

# Request timeout in seconds
request_timeout_secs = 10

[refresh]
# Poll the categories endpoint while category cards are on the page
enabled = true

# Delay between polls (ms)
interval_ms = 30000

[counter]
# Delay between counter frames (ms)
tick_ms = 20

# Increments needed to reach the target
steps = 50

[reveal]
# Visible fraction that reveals a card
threshold = 0.1

# Viewport margin for the visibility observer
root_margin = "0px 0px -50px 0px"

# Initial downward offset of hidden cards (px)
offset_px = 20

# CSS transition used while revealing
transition = "all 0.6s ease"

[preferences]
# Theme preference file (default: <config dir>/jobboard/preferences.json)
# path = "/home/me/.config/jobboard/preferences.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
