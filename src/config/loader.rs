//! Loading `probe.toml`

use super::defaults::*;
use crate::core::types::Offset;
use crate::memory::{FieldSpec, PointerWidth};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub chain: ChainConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Array of tables, kept last so it serializes after the plain tables
    #[serde(default = "reference_fields")]
    pub fields: Vec<FieldSpec>,
}

/// Which process to attach to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_window_class")]
    pub window_class: String,
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_module")]
    pub module: String,
}

/// Pointer chain from the module base to the structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_chain")]
    pub offsets: Vec<Offset>,
    #[serde(default = "default_pointer_width")]
    pub pointer_width: PointerWidth,
}

/// Retry cadences in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_search_interval_ms")]
    pub search_interval_ms: u64,
    #[serde(default = "default_attach_interval_ms")]
    pub attach_interval_ms: u64,
    #[serde(default = "default_pid_retry_ms")]
    pub pid_retry_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Consecutive chain failures before the layout is reported stale
    #[serde(default = "default_stale_after")]
    pub stale_after: u32,
    #[serde(default)]
    pub restart_on_exit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads configuration from file
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Loads the file, falling back to defaults only when it does not exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        match self.load() {
            Err(ConfigError::FileNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        fs::write(&self.config_path, config.to_toml()?)?;
        Ok(())
    }
}

impl Config {
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Loads `probe.toml` from the working directory, or the defaults
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new(DEFAULT_CONFIG_FILE).load_or_default()
}

fn default_window_class() -> String {
    DEFAULT_WINDOW_CLASS.to_string()
}

fn default_window_title() -> String {
    DEFAULT_WINDOW_TITLE.to_string()
}

fn default_module() -> String {
    DEFAULT_MODULE.to_string()
}

fn default_chain() -> Vec<Offset> {
    DEFAULT_CHAIN.iter().copied().map(Offset::new).collect()
}

fn default_pointer_width() -> PointerWidth {
    PointerWidth::try_from(DEFAULT_POINTER_WIDTH).unwrap_or_default()
}

fn default_search_interval_ms() -> u64 {
    DEFAULT_SEARCH_INTERVAL_MS
}

fn default_attach_interval_ms() -> u64 {
    DEFAULT_ATTACH_INTERVAL_MS
}

fn default_pid_retry_ms() -> u64 {
    DEFAULT_PID_RETRY_MS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

fn default_stale_after() -> u32 {
    DEFAULT_STALE_AFTER
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        TargetConfig {
            window_class: default_window_class(),
            window_title: default_window_title(),
            module: default_module(),
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            offsets: default_chain(),
            pointer_width: default_pointer_width(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            search_interval_ms: default_search_interval_ms(),
            attach_interval_ms: default_attach_interval_ms(),
            pid_retry_ms: default_pid_retry_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            stale_after: default_stale_after(),
            restart_on_exit: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target: TargetConfig::default(),
            chain: ChainConfig::default(),
            polling: PollingConfig::default(),
            logging: LoggingConfig::default(),
            fields: reference_fields(),
        }
    }
}
