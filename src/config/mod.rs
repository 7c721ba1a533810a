//! Configuration for the probe
//!
//! The target's window identity, module name, pointer chain and field
//! table are external configuration (`probe.toml`). Built-in defaults hold
//! the reference layout so the probe runs without a file.

pub mod defaults;
mod loader;
mod validator;

pub use defaults::{default_config, reference_fields, DEFAULT_CONFIG_FILE};
pub use loader::{
    load_config, ChainConfig, Config, ConfigError, ConfigLoader, LoggingConfig, PollingConfig,
    TargetConfig,
};
pub use validator::{validate_config, ConfigValidator};

pub type ConfigResult<T> = Result<T, ConfigError>;
