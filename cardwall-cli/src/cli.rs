//! CLI definition for the cardwall command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cardwall - a three-column kanban board.
///
/// Cards live in `todo`, `in-progress` and `done`. The board is stored as a
/// JSON document, `.cardwall/board.json` by default.
#[derive(Parser, Debug)]
#[command(name = "cardwall")]
#[command(version)]
#[command(about = "A three-column kanban board for the terminal and HTTP")]
#[command(
    long_about = "Cardwall keeps a three-column kanban board (todo, in-progress, done) \
    in a JSON document and serves it over HTTP.\n\n\
    Configuration is read from cardwall.toml, cardwall.yaml or cardwall.json in the \
    working directory, or from the file given with --config.\n\n\
    Environment variables:\n  \
    CARDWALL_STORE              Override the board document path\n  \
    CARDWALL_REBALANCE_EPSILON  Gap below which a column is renumbered\n  \
    CARDWALL_SERVER__HOST       Address for `cardwall serve`\n  \
    CARDWALL_SERVER__PORT       Port for `cardwall serve`\n  \
    RUST_LOG                    Log filter (overrides log_level)"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file to use instead of discovery
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Board document to use
    #[arg(long, global = true, value_name = "FILE")]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the board
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a card to the end of a column
    Add {
        /// Column: todo, in-progress or done
        column: String,
        /// Card text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a card
    #[command(alias = "delete")]
    Rm {
        /// Card id
        id: String,
    },

    /// Move a card to a column, optionally at a given index
    Mv {
        /// Card id
        id: String,
        /// Destination column
        column: String,
        /// Destination index (defaults to the end of the column)
        #[arg(long, short)]
        index: Option<usize>,
    },

    /// Renumber card positions to whole numbers
    Rebalance {
        /// Column to rebalance (all columns when omitted)
        column: Option<String>,
    },

    /// Serve the board over HTTP
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long, short)]
        port: Option<u16>,
    },
}
