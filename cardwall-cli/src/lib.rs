//! Cardwall command-line interface and HTTP server
//!
//! The binary is a thin wrapper: [`Cli`] is parsed, [`CardwallConfig`] is
//! resolved, and one of the [`commands`] runs against a
//! [`cardwall_board::BoardSession`] opened on the configured store.

pub mod cli;
pub mod commands;
pub mod config;
pub mod server;

pub use cli::{Cli, Commands};
pub use config::{CardwallConfig, ConfigError};

/// Load configuration and apply the global flags on top of it
pub fn resolve_config(cli: &Cli) -> Result<CardwallConfig, ConfigError> {
    let mut config = CardwallConfig::load(cli.config.as_deref())?;
    if let Some(store) = &cli.store {
        config.store = store.clone();
    }
    Ok(config)
}
