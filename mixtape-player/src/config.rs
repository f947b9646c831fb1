//! mixtape-player configuration
//!
//! Loaded from TOML via [`mixtape_common::config::load_config`]. Every field has a
//! built-in default, so an absent file or a partial file are both valid.
//!
//! ```toml
//! user_id = 42
//! records_path = "/var/lib/mixtape/sessions.jsonl"
//!
//! [token]
//! check_interval_secs = 900
//!
//! [logging]
//! level = "debug"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use mixtape_common::config::{self, ConfigSource, LoggingConfig, CONFIG_ENV_VAR};
use serde::Deserialize;

use crate::auth::TokenLifecycleConfig;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlayerConfig {
    /// User whose listening sessions are recorded
    #[serde(default)]
    pub user_id: i64,

    /// Event bus buffer per subscriber
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    /// JSON-lines file receiving session records; log-only sink when unset
    #[serde(default)]
    pub records_path: Option<PathBuf>,

    /// Timing for an embedding app's [`TokenLifecycleManager`](crate::auth::TokenLifecycleManager)
    ///
    /// The headless binary has no network refresher and never starts the token task; the
    /// section is parsed here so apps embedding the library share one config file.
    #[serde(default)]
    pub token: TokenConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            user_id: 0,
            event_bus_capacity: default_event_bus_capacity(),
            records_path: None,
            token: TokenConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_event_bus_capacity() -> usize {
    100
}

/// Token lifecycle timing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenConfig {
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: i64,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    #[serde(default = "default_max_retry_delay_secs")]
    pub max_retry_delay_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            refresh_margin_secs: default_refresh_margin_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            max_retry_delay_secs: default_max_retry_delay_secs(),
        }
    }
}

fn default_check_interval_secs() -> u64 {
    900
}

fn default_refresh_margin_secs() -> i64 {
    300
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_max_retry_delay_secs() -> u64 {
    300
}

impl From<&TokenConfig> for TokenLifecycleConfig {
    fn from(config: &TokenConfig) -> Self {
        Self {
            check_interval: Duration::from_secs(config.check_interval_secs.max(1)),
            refresh_margin: chrono::Duration::seconds(config.refresh_margin_secs.max(0)),
            retry_delay: Duration::from_secs(config.retry_delay_secs.max(1)),
            max_retry_delay: Duration::from_secs(
                config.max_retry_delay_secs.max(config.retry_delay_secs.max(1)),
            ),
        }
    }
}

impl PlayerConfig {
    /// Resolve and load configuration (CLI path → `MIXTAPE_CONFIG` → platform file → defaults)
    pub fn load(cli_path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        Ok(config::load_config(cli_path, CONFIG_ENV_VAR)?)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(mixtape_common::Error::from)?;
        Ok(config)
    }
}
