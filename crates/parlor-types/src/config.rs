//! Configuration types for Parlor.
//!
//! `ParlorConfig` represents the `parlor.toml` file that controls the store
//! location, the HTTP listener, reaper timing, and log output. Every field
//! has a default, so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParlorConfig {
    /// sqlx connection string for the document store.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub reaper: ReaperConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_database_url() -> String {
    "sqlite://parlor.db?mode=rwc".to_string()
}

impl Default for ParlorConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            server: ServerConfig::default(),
            reaper: ReaperConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Reaper timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Seconds between reaper cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// A participant silent for longer than this is evicted.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_interval_secs() -> u64 {
    15
}

fn default_stale_after_secs() -> u64 {
    10
}

impl ReaperConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Emit JSON log lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
    /// Export spans to stdout through OpenTelemetry.
    #[serde(default)]
    pub otel: bool,
}
