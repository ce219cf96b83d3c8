//! Live connection registry.

use crate::protocol::ServerEvent;
use crate::router::Dispatch;
use crate::session::ConnectionId;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, instrument, trace};

/// Sender half of a connection's outbound channel.
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Maps connection identifiers to their outbound channels.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    next_id: u64,
    senders: HashMap<ConnectionId, ConnectionSender>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an identifier and an outbound channel for a new connection.
    #[instrument(skip(self))]
    pub fn register(&mut self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        self.next_id += 1;
        let id = ConnectionId::from(self.next_id);
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.insert(id, tx);
        debug!(connection_id = %id, live = self.senders.len(), "Connection registered");
        (id, rx)
    }

    /// Forgets a connection. Returns whether it was registered.
    #[instrument(skip(self), fields(connection_id = %id))]
    pub fn unregister(&mut self, id: ConnectionId) -> bool {
        let removed = self.senders.remove(&id).is_some();
        debug!(removed, live = self.senders.len(), "Connection unregistered");
        removed
    }

    /// Queues a dispatch for every live recipient.
    ///
    /// Returns the number of connections the event was queued for.
    /// Recipients that are gone are skipped.
    #[instrument(skip(self, dispatch), fields(event = dispatch.event.name(), recipients = dispatch.recipients.len()))]
    pub fn deliver(&self, dispatch: &Dispatch) -> usize {
        let mut delivered = 0;
        for id in &dispatch.recipients {
            match self.senders.get(id) {
                Some(tx) if tx.send(dispatch.event.clone()).is_ok() => delivered += 1,
                _ => trace!(connection_id = %id, "Recipient no longer connected"),
            }
        }
        delivered
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.senders.len()
    }

    /// Whether no connection is live.
    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_skips_departed_connections() {
        let mut registry = ConnectionRegistry::new();
        let (a, mut rx_a) = registry.register();
        let (b, _rx_b) = registry.register();
        assert_ne!(a, b);
        registry.unregister(b);

        let delivered = registry.deliver(&Dispatch::to_session(
            vec![a, b],
            ServerEvent::RulesChanged,
        ));
        assert_eq!(delivered, 1);
        assert_eq!(rx_a.try_recv().unwrap(), ServerEvent::RulesChanged);
    }
}
