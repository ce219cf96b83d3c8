//! Relay server bootstrap.

use crate::config::RelayConfig;
use crate::transport::{Hub, build_router};
use anyhow::Result;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Binds the configured address and serves until Ctrl+C.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: &RelayConfig) -> Result<()> {
    let listener = TcpListener::bind((config.host().as_str(), *config.port())).await?;
    serve_listener(listener, Hub::new(), shutdown_signal()).await
}

/// Serves the relay on an already-bound listener until `shutdown` resolves.
#[instrument(skip_all)]
pub async fn serve_listener<F>(listener: TcpListener, hub: Hub, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "Relay listening");
    axum::serve(listener, build_router(hub))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
