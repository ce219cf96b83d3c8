//! WebSocket connection actor.

use super::hub::Hub;
use crate::protocol::ServerEvent;
use crate::session::ConnectionId;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// `GET /ws`: upgrades and runs the connection actor.
pub async fn ws_upgrade(State(hub): State<Hub>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_connection(socket, hub))
}

/// Runs one connection until the peer goes away.
///
/// The reader half feeds text frames to the hub; a writer task drains the
/// connection's outbound channel into the socket.
#[instrument(skip_all)]
pub async fn run_connection(socket: WebSocket, hub: Hub) {
    let (connection, outbound) = hub.connect();
    let (sink, mut stream) = socket.split();
    let writer = tokio::spawn(writer_task(connection, sink, outbound));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                hub.receive(connection, text.as_str());
            }
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection, "Ignoring binary frame");
            }
            Ok(Message::Close(_)) => {
                debug!(connection_id = %connection, "Close frame received");
                break;
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => {}
            Err(e) => {
                warn!(connection_id = %connection, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    // Unregistering drops the outbound sender, which ends the writer.
    hub.disconnect(connection);
    if let Err(e) = writer.await {
        error!(connection_id = %connection, error = %e, "Writer task failed");
    }
    info!(connection_id = %connection, "Connection closed");
}

async fn writer_task(
    connection: ConnectionId,
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = outbound.recv().await {
        let text = match serde_json::to_string(&event) {
            Ok(text) => text,
            Err(e) => {
                error!(connection_id = %connection, error = %e, "Failed to encode event");
                continue;
            }
        };
        if sink.send(Message::Text(text.into())).await.is_err() {
            debug!(connection_id = %connection, "Peer gone, stopping writer");
            break;
        }
    }
    let _ = sink.close().await;
}
