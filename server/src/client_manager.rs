//! Live connection bookkeeping for the chat server
//!
//! This module tracks which peers are currently connected:
//! - Connection ids handed out in accept order
//! - Peer addresses and connect times for logging
//! - Optional cap on simultaneous connections
//!
//! Sessions never consult the registry; it only serves the accept loop.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected peer
#[derive(Debug)]
pub struct Client {
    /// Connection id assigned by the server
    pub id: u32,
    /// Peer address of the connection
    pub addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
        }
    }

    /// How long this client has been connected
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Registry of connected clients
///
/// Ids start at 1 and are never reused while the server runs. When a limit
/// is set, connections beyond it are refused.
pub struct ClientManager {
    /// Connected clients indexed by id
    clients: HashMap<u32, Client>,
    /// Next id to hand out
    next_client_id: u32,
    /// Maximum number of simultaneous clients, unbounded when `None`
    max_clients: Option<usize>,
}

impl ClientManager {
    pub fn new(max_clients: Option<usize>) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a new connection
    ///
    /// Returns the assigned id, or `None` when the server is full.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        if let Some(max) = self.max_clients {
            if self.clients.len() >= max {
                return None;
            }
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Forgets a connection. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &u32) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                "Client {} ({}) disconnected after {:.1}s",
                client.id,
                client.addr,
                client.connected_for().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Ids and addresses of every connected client
    pub fn client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
