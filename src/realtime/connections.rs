//! The set of live realtime clients.
//!
//! Connects arrive from the transport layer at any wall-clock moment while
//! the scheduler broadcasts from its own task, so the set is guarded by an
//! `RwLock`: broadcasts (reads) vastly outnumber joins/leaves (writes).

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;

/// Unique identifier for one realtime client connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Connection {
    /// Opaque client identifier (origin address), used only for logging.
    peer: String,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Tracks currently-connected realtime clients.
#[derive(Default)]
pub struct ConnectionSet {
    clients: RwLock<HashMap<ConnectionId, Connection>>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection and hands back its id and message receiver.
    ///
    /// The caller (the WebSocket endpoint) forwards everything received to
    /// the client until disconnect, then calls [`leave`](Self::leave).
    pub async fn join(&self, peer: impl Into<String>) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ConnectionId::new();
        self.clients.write().await.insert(
            id.clone(),
            Connection {
                peer: peer.into(),
                tx,
            },
        );
        (id, rx)
    }

    /// Removes a connection. Returns the peer identifier if it was present.
    pub async fn leave(&self, id: &ConnectionId) -> Option<String> {
        self.clients.write().await.remove(id).map(|c| c.peer)
    }

    pub async fn count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Sends a message to every live connection, best-effort.
    ///
    /// Connections whose receiver is gone are pruned. Returns the number of
    /// clients the message was delivered to.
    pub async fn broadcast(&self, message: &ServerMessage) -> usize {
        let mut stale = Vec::new();
        let mut delivered = 0;
        {
            let clients = self.clients.read().await;
            for (id, connection) in clients.iter() {
                if connection.tx.send(message.clone()).is_ok() {
                    delivered += 1;
                } else {
                    stale.push(id.clone());
                }
            }
        }
        if !stale.is_empty() {
            let mut clients = self.clients.write().await;
            for id in stale {
                clients.remove(&id);
            }
        }
        delivered
    }
}
