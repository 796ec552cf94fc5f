//! Subcommand implementations

pub mod add;
pub mod list;
pub mod mv;
pub mod rebalance;
pub mod rm;
pub mod serve;

use crate::config::CardwallConfig;
use anyhow::{anyhow, Context, Result};
use cardwall_board::{BoardSession, ColumnId, FileStore};
use std::sync::Arc;

/// Open a session on the configured store
pub async fn open_session(config: &CardwallConfig, watching: bool) -> Result<BoardSession> {
    let store = if watching {
        FileStore::watching(&config.store)
            .with_context(|| format!("failed to watch {}", config.store.display()))?
    } else {
        FileStore::new(&config.store)
    };

    let session =
        BoardSession::new(Arc::new(store)).with_rebalance_epsilon(config.rebalance_epsilon);
    session
        .reload()
        .await
        .with_context(|| format!("failed to load board from {}", config.store.display()))?;
    Ok(session)
}

/// Parse a column argument
pub fn parse_column(value: &str) -> Result<ColumnId> {
    value.parse::<ColumnId>().map_err(|_| {
        anyhow!(
            "unknown column '{}': expected todo, in-progress or done",
            value
        )
    })
}
