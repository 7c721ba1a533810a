//! Runtime settings for a poll loop, built from validated configuration

use crate::config::defaults::{
    DEFAULT_ATTACH_INTERVAL_MS, DEFAULT_PID_RETRY_MS, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_SEARCH_INTERVAL_MS, DEFAULT_SETTLE_DELAY_MS, DEFAULT_STALE_AFTER,
};
use crate::config::{validate_config, Config, ConfigError};
use crate::memory::{FieldTable, PointerChain};
use crate::process::WindowIdentity;
use std::time::Duration;

/// Retry and polling cadences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub search_interval: Duration,
    pub attach_interval: Duration,
    /// Retry delay when a window is found but has no process id yet
    pub pid_retry: Duration,
    pub poll_interval: Duration,
    /// Pause after the module base is found, before the first poll
    pub settle_delay: Duration,
}

impl Timing {
    /// Same delay everywhere; handy for fast tests
    pub fn uniform(delay: Duration) -> Self {
        Timing {
            search_interval: delay,
            attach_interval: delay,
            pid_retry: delay,
            poll_interval: delay,
            settle_delay: delay,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            search_interval: Duration::from_millis(DEFAULT_SEARCH_INTERVAL_MS),
            attach_interval: Duration::from_millis(DEFAULT_ATTACH_INTERVAL_MS),
            pid_retry: Duration::from_millis(DEFAULT_PID_RETRY_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub identity: WindowIdentity,
    pub module: String,
    pub chain: PointerChain,
    pub fields: FieldTable,
    pub timing: Timing,
    /// Consecutive chain failures before the layout is reported stale
    pub stale_after: u32,
    pub restart_on_exit: bool,
}

impl ProbeSettings {
    pub fn new(
        identity: WindowIdentity,
        module: impl Into<String>,
        chain: PointerChain,
        fields: FieldTable,
    ) -> Self {
        ProbeSettings {
            identity,
            module: module.into(),
            chain,
            fields,
            timing: Timing::default(),
            stale_after: DEFAULT_STALE_AFTER,
            restart_on_exit: false,
        }
    }

    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_stale_after(mut self, stale_after: u32) -> Self {
        self.stale_after = stale_after.max(1);
        self
    }

    pub fn with_restart_on_exit(mut self, restart: bool) -> Self {
        self.restart_on_exit = restart;
        self
    }

    /// Validates `config` and converts it
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        validate_config(config)?;

        let chain = PointerChain::new(config.chain.offsets.clone(), config.chain.pointer_width)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let fields = FieldTable::new(config.fields.clone())
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let polling = &config.polling;
        let timing = Timing {
            search_interval: Duration::from_millis(polling.search_interval_ms),
            attach_interval: Duration::from_millis(polling.attach_interval_ms),
            pid_retry: Duration::from_millis(polling.pid_retry_ms),
            poll_interval: Duration::from_millis(polling.poll_interval_ms),
            settle_delay: Duration::from_millis(polling.settle_delay_ms),
        };

        Ok(ProbeSettings {
            identity: WindowIdentity::new(
                config.target.window_class.clone(),
                config.target.window_title.clone(),
            ),
            module: config.target.module.clone(),
            chain,
            fields,
            timing,
            stale_after: polling.stale_after,
            restart_on_exit: polling.restart_on_exit,
        })
    }
}

impl TryFrom<&Config> for ProbeSettings {
    type Error = ConfigError;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        Self::from_config(config)
    }
}
