//! Command-line interface for tictactoe_relay.

use clap::{Parser, Subcommand};

/// Tic-tac-toe relay - keeps two remote players' boards in sync
#[derive(Parser, Debug)]
#[command(name = "tictactoe_relay")]
#[command(about = "Real-time two-player tic-tac-toe relay", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the WebSocket relay server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<std::path::PathBuf>,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}
