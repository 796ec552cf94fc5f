//! Cardwall CLI - a three-column kanban board.
//!
//! Commands:
//! - `cardwall list [--json]`: Show the board
//! - `cardwall add <column> <text...>`: Add a card to the end of a column
//! - `cardwall rm <id>`: Delete a card
//! - `cardwall mv <id> <column> [--index N]`: Move a card
//! - `cardwall rebalance [column]`: Renumber positions to whole numbers
//! - `cardwall serve [--host H] [--port P]`: Serve the board over HTTP
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cardwall_cli::commands::{self, add, list, mv, rebalance, rm, serve};
use cardwall_cli::{resolve_config, CardwallConfig, Cli, Commands};

/// Map a command result to an exit code, reporting errors on stderr.
fn handle_result(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

async fn run(command: Commands, config: CardwallConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => serve::run_serve(&config, host, port).await,
        Commands::List { json } => {
            let session = commands::open_session(&config, false).await?;
            list::run_list(&session, json).await
        }
        Commands::Add { column, text } => {
            let session = commands::open_session(&config, false).await?;
            add::run_add(&session, &column, &text).await
        }
        Commands::Rm { id } => {
            let session = commands::open_session(&config, false).await?;
            rm::run_rm(&session, &id).await
        }
        Commands::Mv { id, column, index } => {
            let session = commands::open_session(&config, false).await?;
            mv::run_mv(&session, &id, &column, index).await
        }
        Commands::Rebalance { column } => {
            let session = commands::open_session(&config, false).await?;
            rebalance::run_rebalance(&session, column.as_deref()).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    // Initialize tracing with appropriate level
    let filter = if cli.debug {
        EnvFilter::new("cardwall=debug,tower_http=debug")
    } else {
        let fallback = config
            .as_ref()
            .map(|c| c.log_level.clone())
            .unwrap_or_else(|_| "warn".to_string());
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&fallback))
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match config {
        Ok(config) => handle_result(run(cli.command, config).await),
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    std::process::exit(exit_code);
}
