//! Configuration loader for Parlor.
//!
//! Reads `parlor.toml` (or an explicit path) and deserializes it into
//! [`ParlorConfig`]. Falls back to defaults when the file is missing or
//! malformed, then applies `PARLOR_*` environment overrides.
//!
//! Loading happens before the tracing subscriber exists, so problems are
//! returned as [`ConfigWarning`]s for the caller to log once it is installed.

use std::path::{Path, PathBuf};

use parlor_types::config::{ParlorConfig, ReaperConfig};
use parlor_types::participant::stale_cutoff;
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "parlor.toml";

/// A recoverable problem found while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigWarning {
    #[error("Failed to read {}: {source}, using defaults", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}, using defaults", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Ignoring {key}={value}: {reason}")]
    InvalidEnv {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("reaper.stale_after_secs = {0} is out of range, using the default")]
    StaleAfterOutOfRange(u64),
}

/// Configuration plus everything that had to be worked around to build it.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ParlorConfig,
    pub warnings: Vec<ConfigWarning>,
}

/// Load configuration from `path` (or `./parlor.toml`) plus the environment.
pub async fn load_config(path: Option<&Path>) -> LoadedConfig {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let mut warnings = Vec::new();

    let config = match load_config_file(path).await {
        Ok(config) => config,
        Err(warning) => {
            warnings.push(warning);
            ParlorConfig::default()
        }
    };
    let config = apply_env_overrides(config, |key| std::env::var(key).ok(), &mut warnings);
    let config = check_reaper_threshold(config, &mut warnings);

    LoadedConfig { config, warnings }
}

/// Load a config file.
///
/// - If the file does not exist, returns [`ParlorConfig::default()`].
/// - If the file exists but cannot be read or parsed, returns the warning;
///   the caller falls back to defaults.
pub async fn load_config_file(path: &Path) -> Result<ParlorConfig, ConfigWarning> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ParlorConfig::default());
        }
        Err(source) => {
            return Err(ConfigWarning::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    toml::from_str::<ParlorConfig>(&content).map_err(|source| ConfigWarning::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `PARLOR_DATABASE_URL`, `PARLOR_HOST`, and `PARLOR_PORT`.
///
/// An unparsable port is skipped and reported.
pub fn apply_env_overrides(
    mut config: ParlorConfig,
    lookup: impl Fn(&str) -> Option<String>,
    warnings: &mut Vec<ConfigWarning>,
) -> ParlorConfig {
    if let Some(url) = lookup("PARLOR_DATABASE_URL") {
        config.database_url = url;
    }
    if let Some(host) = lookup("PARLOR_HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PARLOR_PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(err) => warnings.push(ConfigWarning::InvalidEnv {
                key: "PARLOR_PORT",
                value: port,
                reason: err.to_string(),
            }),
        }
    }
    config
}

/// Replace a staleness threshold that reaches past the representable date
/// range, which would otherwise abort every reaper cycle.
fn check_reaper_threshold(
    mut config: ParlorConfig,
    warnings: &mut Vec<ConfigWarning>,
) -> ParlorConfig {
    let now = chrono::Utc::now();
    if stale_cutoff(now, config.reaper.stale_after()).is_none() {
        warnings.push(ConfigWarning::StaleAfterOutOfRange(
            config.reaper.stale_after_secs,
        ));
        config.reaper.stale_after_secs = ReaperConfig::default().stale_after_secs;
    }
    config
}
