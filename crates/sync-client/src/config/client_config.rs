//! Client configuration structs
//!
//! Loads configuration from `SYNC_`-prefixed environment variables; every
//! field has a default, so an empty environment yields a working config.

use serde::Deserialize;
use std::time::Duration;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

/// Synchronization client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Application-level presence refresh cadence while authenticated
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Typing signal TTL; expiry emits the stop signal automatically
    #[serde(default = "default_typing_ttl_secs")]
    pub typing_ttl_secs: u64,

    /// Outbound queue capacity; oldest entries are evicted past this bound
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Reconnection backoff policy
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl SyncConfig {
    /// Load from the environment (`SYNC_` prefix, `__` separator for the
    /// reconnect section, e.g. `SYNC_RECONNECT__MAX_ATTEMPTS=5`).
    ///
    /// A `.env` file is loaded first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("SYNC").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Heartbeat cadence as a `Duration`
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    /// Typing TTL as a `Duration`
    #[must_use]
    pub fn typing_ttl(&self) -> Duration {
        Duration::from_secs(self.typing_ttl_secs)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval_secs(),
            typing_ttl_secs: default_typing_ttl_secs(),
            queue_capacity: default_queue_capacity(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

// Default value functions
fn default_heartbeat_interval_secs() -> u64 {
    60
}

fn default_typing_ttl_secs() -> u64 {
    5
}

fn default_queue_capacity() -> usize {
    100
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    10
}
