//! WebSocket transport for the Platepick gateway.
//!
//! A room client needs two things at once: to send actions, and to
//! receive events published on the topics it subscribed to. Each
//! accepted connection is therefore split into a [`WsSender`] and a
//! [`WsReceiver`] that live in different tasks, so a pending `recv`
//! never blocks an outbound event.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{WebSocketListener, WsReceiver, WsSender};

use std::fmt;

/// Opaque identifier for a connection, shared by both of its halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
