//! Shared relay state behind a single lock.

use super::registry::ConnectionRegistry;
use crate::protocol::ServerEvent;
use crate::router::Relay;
use crate::session::ConnectionId;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct HubState {
    relay: Relay,
    registry: ConnectionRegistry,
}

/// Connection lifecycle entry point shared by all socket tasks.
///
/// One lock covers both the sessions and the registry, so a signal's state
/// change and the queuing of its broadcasts happen as one step.
#[derive(Debug, Clone, Default)]
pub struct Hub {
    inner: Arc<Mutex<HubState>>,
}

impl Hub {
    /// Creates a hub with no sessions and no connections.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating connection hub");
        Self {
            inner: Arc::new(Mutex::new(HubState {
                relay: Relay::new(),
                registry: ConnectionRegistry::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A new participant connected.
    #[instrument(skip(self))]
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let (id, rx) = self.lock().registry.register();
        info!(connection_id = %id, "Participant connected");
        (id, rx)
    }

    /// A participant sent a text frame. Returns how many deliveries were queued.
    #[instrument(skip(self, frame), fields(connection_id = %connection))]
    pub fn receive(&self, connection: ConnectionId, frame: &str) -> usize {
        let mut state = self.lock();
        let dispatches = state.relay.handle_frame(connection, frame);
        let queued = dispatches
            .iter()
            .map(|dispatch| state.registry.deliver(dispatch))
            .sum();
        debug!(dispatches = dispatches.len(), queued, "Signal handled");
        queued
    }

    /// A participant disconnected.
    #[instrument(skip(self), fields(connection_id = %connection))]
    pub fn disconnect(&self, connection: ConnectionId) {
        let mut state = self.lock();
        state.registry.unregister(connection);
        state.relay.disconnect(connection);
        info!(
            live_connections = state.registry.len(),
            idle = state.registry.is_empty(),
            "Participant disconnected"
        );
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.lock().relay.store().len()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.lock().registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_reaches_sender_channel() {
        let hub = Hub::new();
        let (id, mut rx) = hub.connect();
        assert_eq!(hub.receive(id, r#"{"event":"createGame"}"#), 1);
        assert!(matches!(rx.try_recv().unwrap(), ServerEvent::GameCreated(_)));
        assert_eq!(hub.session_count(), 1);

        hub.disconnect(id);
        assert_eq!(hub.session_count(), 0);
        assert_eq!(hub.connection_count(), 0);
    }
}
