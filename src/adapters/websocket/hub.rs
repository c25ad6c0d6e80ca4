//! Connection hub: every dashboard client shares one room.
//!
//! The hub wraps a single broadcast channel. Telemetry feeds and
//! room-wide replies go through [`Hub::broadcast`]; per-client replies
//! bypass it on the connection's own unicast queue.

use std::collections::HashSet;

use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::protocol::ServerEvent;

/// Unique identifier for one WebSocket client connection, generated
/// server-side on accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shared broadcast room for all connected dashboards.
///
/// Slow clients that fall further behind than the channel capacity miss
/// events; the dashboard is a live view, not a durable feed.
pub struct Hub {
    events: broadcast::Sender<ServerEvent>,
    clients: RwLock<HashSet<ClientId>>,
}

impl Hub {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            events,
            clients: RwLock::new(HashSet::new()),
        }
    }

    /// Registers a connection and returns its event feed.
    pub async fn join(&self, client_id: ClientId) -> broadcast::Receiver<ServerEvent> {
        self.clients.write().await.insert(client_id);
        self.events.subscribe()
    }

    pub async fn leave(&self, client_id: &ClientId) {
        self.clients.write().await.remove(client_id);
    }

    /// Fans an event out to every connected client. A hub with no
    /// clients swallows the event.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }

    /// Sender handle for the telemetry feeds.
    pub fn sender(&self) -> broadcast::Sender<ServerEvent> {
        self.events.clone()
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(128)
    }
}
