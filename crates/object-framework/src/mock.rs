//! # Mock Framework
//!
//! Utilities for testing objects and their clients without real transports or
//! real persistence.
//!
//! - [`FlakyStore`]: an in-memory [`DurableStore`] whose reads or writes can be made
//!   to fail on demand.
//! - [`test_peer`]: a stand-in for a stream peer. Hand the sender to
//!   `ObjectClient::accept` and read what the object pushed from the [`TestPeer`].
//! - [`create_mock_client`] / [`expect_call`]: test a domain client against a
//!   channel you control instead of a running object.
//!
//! ## Example
//!
//! ```rust,ignore
//! let store = Arc::new(FlakyStore::new());
//! let (actor, client) = ObjectActor::new("foo", Greeter::default(), ObjectStorage::new(store.clone(), "foo"), 8);
//! tokio::spawn(actor.run());
//!
//! let (sender, mut peer) = test_peer();
//! client.accept(sender).await?;
//! assert_eq!(peer.next_json(), Some(json!({ "welcome": "Welcome!" })));
//!
//! store.fail_puts(true);
//! assert!(client.call(GreeterAction::SetGreeting("Hi".into())).await.is_err());
//! assert_eq!(peer.next_json(), None);
//! ```

use crate::connection::{self, ConnectionReceiver, ConnectionSender, OutboundFrame};
use crate::entity::ObjectEntity;
use crate::error::{FrameworkError, StoreError};
use crate::message::ObjectRequest;
use crate::store::{DurableStore, MemoryStore};
use crate::ObjectClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// STORE
// =============================================================================

/// An in-memory store with switchable failures.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_gets: AtomicBool,
    fail_puts: AtomicBool,
    puts: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail (or succeed again).
    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `put` fail (or succeed again).
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("get {key}")));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("put {key}")));
        }
        self.inner.put(key, value).await?;
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// STREAM PEER
// =============================================================================

/// The receiving end of a test connection.
pub struct TestPeer {
    receiver: ConnectionReceiver,
}

/// Creates a test connection: the sender goes to the object, the peer stays with the test.
pub fn test_peer() -> (ConnectionSender, TestPeer) {
    let (sender, receiver) = connection::channel();
    (sender, TestPeer { receiver })
}

impl TestPeer {
    /// The next frame already delivered, if any. Never waits.
    pub fn next_frame(&mut self) -> Option<OutboundFrame> {
        self.receiver.try_recv().ok()
    }

    /// The next delivered text frame decoded as JSON. Never waits.
    ///
    /// # Panics
    /// If the next frame is a close frame or not valid JSON.
    pub fn next_json(&mut self) -> Option<serde_json::Value> {
        self.next_frame().map(|frame| match frame {
            OutboundFrame::Text(text) => {
                serde_json::from_str(&text).expect("object sent invalid JSON")
            }
            other => panic!("expected a text frame, got {other:?}"),
        })
    }

    /// Waits up to `timeout` for the next frame.
    pub async fn recv_frame(&mut self, timeout: Duration) -> Option<OutboundFrame> {
        tokio::time::timeout(timeout, self.receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// Waits up to `timeout` for the next text frame, decoded as JSON.
    pub async fn recv_json(&mut self, timeout: Duration) -> Option<serde_json::Value> {
        match self.recv_frame(timeout).await? {
            OutboundFrame::Text(text) => serde_json::from_str(&text).ok(),
            OutboundFrame::Close { .. } => None,
        }
    }

    /// Every frame delivered so far.
    pub fn drain(&mut self) -> Vec<OutboundFrame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.receiver.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

// =============================================================================
// CLIENT HELPERS
// =============================================================================

/// Creates a client and the receiving end of its mailbox.
///
/// # Testing Strategy
/// To test a domain client without spinning up an object, send through this client
/// and answer the requests yourself with [`expect_call`].
pub fn create_mock_client<T: ObjectEntity>(
    buffer_size: usize,
) -> (ObjectClient<T>, mpsc::Receiver<ObjectRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ObjectClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Call request.
pub async fn expect_call<T: ObjectEntity>(
    receiver: &mut mpsc::Receiver<ObjectRequest<T>>,
) -> Option<(
    T::Action,
    oneshot::Sender<Result<T::ActionResult, FrameworkError>>,
)> {
    match receiver.recv().await {
        Some(ObjectRequest::Call { action, respond_to }) => Some((action, respond_to)),
        _ => None,
    }
}
