//! Connection lifecycle: WebSocket transport around the relay.

mod hub;
mod registry;
mod ws;

pub use hub::Hub;
pub use registry::{ConnectionRegistry, ConnectionSender};
pub use ws::{run_connection, ws_upgrade};

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builds the HTTP router: `/ws` for participants, `/health` for liveness checks.
pub fn build_router(hub: Hub) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(hub)
}

async fn health() -> &'static str {
    "ok"
}
