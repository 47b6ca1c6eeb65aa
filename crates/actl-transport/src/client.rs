//! Client connection tracking.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Read-only summary of one open connection.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    /// Unique client ID
    pub id: String,
    pub remote_addr: SocketAddr,
    /// When the client connected
    pub connected_at: Instant,
}

impl ClientConnection {
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            remote_addr,
            connected_at: Instant::now(),
        }
    }

    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Connections currently being served, keyed by client id.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: DashMap<String, ClientConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&self, client: ClientConnection) {
        self.clients.insert(client.id.clone(), client);
    }

    pub(crate) fn remove(&self, id: &str) -> Option<ClientConnection> {
        self.clients.remove(id).map(|(_, client)| client)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<ClientConnection> {
        self.clients.get(id).map(|entry| entry.value().clone())
    }

    pub fn snapshot(&self) -> Vec<ClientConnection> {
        self.clients.iter().map(|entry| entry.value().clone()).collect()
    }
}
