//! Tic-tac-toe relay - CLI entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_relay::{RelayConfig, serve};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing();

    match cli.command {
        Command::Serve { config, host, port } => run_server(config, host, port).await,
    }
}

/// Run the relay server
#[instrument(skip_all)]
async fn run_server(
    config: Option<std::path::PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = RelayConfig::resolve(config.as_deref(), host, port)?;
    info!(host = %config.host(), port = config.port(), "Starting tic-tac-toe relay");
    serve(&config).await
}

fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictactoe_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
