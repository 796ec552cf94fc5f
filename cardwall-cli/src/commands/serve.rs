//! `cardwall serve` - run the HTTP API

use super::open_session;
use crate::config::CardwallConfig;
use crate::server;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the board until Ctrl-C, reloading whenever the store file changes
pub async fn run_serve(
    config: &CardwallConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let session = Arc::new(open_session(config, true).await?);
    let watcher = session.watch_changes();

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("failed to bind {}:{}", host, port))?;

    let result = server::serve(listener, session).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    result.context("HTTP server failed")
}
