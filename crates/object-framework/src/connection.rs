//! # Connection Registry
//!
//! The in-memory set of open stream connections belonging to one object instance.
//! Nothing here is persisted: a restarted instance starts with an empty registry.
//!
//! Each connection is represented by the sending half of an unbounded channel. The
//! transport (a WebSocket session, or a test peer) owns the receiving half and
//! drains it at its own pace, so pushing a frame never waits on a slow peer. A send
//! fails only when the receiving half is gone, which means the peer is gone.

use crate::error::SendError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Identity of one accepted stream. Never reused within an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

/// A frame the object pushes to a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Text(String),
    Close { code: u16, reason: String },
}

/// A frame received from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

impl InboundFrame {
    pub fn len(&self) -> usize {
        match self {
            InboundFrame::Text(text) => text.len(),
            InboundFrame::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a stream ended, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseEvent {
    pub code: u16,
    pub reason: String,
    pub was_clean: bool,
}

impl CloseEvent {
    /// Normal closure (1000).
    pub const NORMAL: u16 = 1000;
    /// Closed without a close frame (1006).
    pub const ABNORMAL: u16 = 1006;

    pub fn clean(code: u16, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
            was_clean: true,
        }
    }

    /// The peer vanished without a close handshake.
    pub fn abnormal() -> Self {
        Self {
            code: Self::ABNORMAL,
            reason: String::new(),
            was_clean: false,
        }
    }

    /// The code to echo back in our own close frame. 1006 is reserved and must not
    /// appear on the wire, so it is replaced with a normal closure.
    pub fn reply_code(&self) -> u16 {
        match self.code {
            Self::ABNORMAL | 1005 | 1015 => Self::NORMAL,
            code => code,
        }
    }
}

/// Sending half handed to the object when a stream is accepted.
pub type ConnectionSender = mpsc::UnboundedSender<OutboundFrame>;

/// Receiving half kept by the transport.
pub type ConnectionReceiver = mpsc::UnboundedReceiver<OutboundFrame>;

/// Creates the channel pair backing one connection.
pub fn channel() -> (ConnectionSender, ConnectionReceiver) {
    mpsc::unbounded_channel()
}

/// Live connections of one object instance.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    members: BTreeMap<ConnectionId, ConnectionSender>,
    /// Members evicted after a failed send whose close hasn't been reported yet.
    evicted: BTreeSet<ConnectionId>,
    next_id: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new connection and returns its id.
    pub fn insert(&mut self, sender: ConnectionSender) -> ConnectionId {
        self.next_id += 1;
        let id = ConnectionId(self.next_id);
        self.members.insert(id, sender);
        debug!(connection = %id, users = self.members.len(), "Connection registered");
        id
    }

    /// Removes a connection. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ConnectionId) -> bool {
        let removed = self.members.remove(&id).is_some();
        if removed {
            debug!(connection = %id, users = self.members.len(), "Connection removed");
        }
        removed
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Snapshot of the current member ids.
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.members.keys().copied().collect()
    }

    /// Encodes `payload` as JSON and sends it to one connection.
    ///
    /// A connection whose peer is gone is evicted.
    pub fn send<M: Serialize + ?Sized>(
        &mut self,
        id: ConnectionId,
        payload: &M,
    ) -> Result<(), SendError> {
        let text = serde_json::to_string(payload)?;
        self.send_text(id, text)
    }

    fn send_text(&mut self, id: ConnectionId, text: String) -> Result<(), SendError> {
        let Some(sender) = self.members.get(&id) else {
            return Err(SendError::Gone(id));
        };
        if sender.send(OutboundFrame::Text(text)).is_err() {
            warn!(connection = %id, "Send failed, evicting connection");
            self.members.remove(&id);
            self.evicted.insert(id);
            return Err(SendError::Gone(id));
        }
        Ok(())
    }

    /// Encodes `payload` once and sends it to every member.
    ///
    /// Iterates over a snapshot of the ids. A failed send evicts that member and
    /// delivery continues with the rest. Returns the number of members reached.
    pub fn broadcast<M: Serialize + ?Sized>(&mut self, payload: &M) -> Result<usize, SendError> {
        let text = serde_json::to_string(payload)?;
        let mut delivered = 0;
        for id in self.ids() {
            if self.send_text(id, text.clone()).is_ok() {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    /// Sends a close frame to one connection and removes it.
    ///
    /// Returns `true` exactly once per connection: for a live member, or for a member
    /// evicted after a failed send whose close arrives later (no frame is sent then).
    /// Returns `false` if the close was already reported.
    pub fn close(&mut self, id: ConnectionId, code: u16, reason: &str) -> bool {
        if self.evicted.remove(&id) {
            debug!(connection = %id, users = self.members.len(), "Evicted connection closed");
            return true;
        }
        let Some(sender) = self.members.remove(&id) else {
            return false;
        };
        // The peer may already be gone; the close frame is best effort.
        let _ = sender.send(OutboundFrame::Close {
            code,
            reason: reason.to_string(),
        });
        debug!(connection = %id, users = self.members.len(), "Connection closed");
        true
    }

    /// Closes every member. Used on instance teardown.
    pub fn close_all(&mut self, code: u16, reason: &str) -> usize {
        self.evicted.clear();
        let ids = self.ids();
        for id in &ids {
            self.close(*id, code, reason);
        }
        ids.len()
    }
}
