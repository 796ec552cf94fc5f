//! Configuration for the cardwall binary
//!
//! Sources are merged in precedence order (later sources override earlier ones):
//! 1. Built-in defaults
//! 2. `cardwall.toml`, `cardwall.yaml` or `cardwall.json` in the working
//!    directory, or the file passed with `--config`
//! 3. Environment variables prefixed `CARDWALL_` (`__` separates nested keys,
//!    e.g. `CARDWALL_SERVER__PORT=9000`)
//! 4. Command line flags, applied by the caller

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CARDWALL_";

/// Config file stem looked up in the working directory
const CONFIG_STEM: &str = "cardwall";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Configuration file format not supported
    #[error("Unsupported configuration file format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// Configuration parsing failed
    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: Box<figment::Error>,
    },

    /// Invalid configuration value
    #[error("Invalid configuration value for key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::ParseError {
            source: Box::new(error),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
        }
    }
}

/// Resolved cardwall configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardwallConfig {
    /// Path to the board document
    pub store: PathBuf,
    /// Gap below which a column is renumbered after a move
    pub rebalance_epsilon: f64,
    /// Log filter used when neither `--debug` nor `RUST_LOG` is set
    pub log_level: String,
    pub server: ServerConfig,
}

impl Default for CardwallConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from(".cardwall").join("board.json"),
            rebalance_epsilon: cardwall_board::position::DEFAULT_REBALANCE_EPSILON,
            log_level: "warn".to_string(),
            server: ServerConfig::default(),
        }
    }
}

impl CardwallConfig {
    /// Load configuration, discovering config files in the working directory
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(&cwd, explicit)
    }

    /// Load configuration, discovering config files in `dir`
    pub fn load_from(dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let figment = Self::figment(dir, explicit)?;
        let config: CardwallConfig = figment.extract()?;
        config.validate()?;
        debug!(store = %config.store.display(), "loaded configuration");
        Ok(config)
    }

    /// Build the figment with all sources in precedence order
    fn figment(dir: &Path, explicit: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(CardwallConfig::default()));

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                figment = merge_file(figment, path)?;
            }
            None => {
                for extension in ["toml", "yaml", "yml", "json"] {
                    let candidate = dir.join(format!("{}.{}", CONFIG_STEM, extension));
                    if candidate.is_file() {
                        trace!("Loading config file: {}", candidate.display());
                        figment = merge_file(figment, &candidate)?;
                    }
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Reject values the board cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rebalance_epsilon.is_finite() || self.rebalance_epsilon <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "rebalance_epsilon".to_string(),
                message: format!(
                    "must be a positive finite number, got {}",
                    self.rebalance_epsilon
                ),
            });
        }
        if self.store.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment, ConfigError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        Some("yaml") | Some("yml") => Ok(figment.merge(Yaml::file(path))),
        Some("json") => Ok(figment.merge(Json::file(path))),
        _ => Err(ConfigError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
