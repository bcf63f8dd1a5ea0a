//! # Object Framework
//!
//! Building blocks for addressable, stateful objects in Rust: one actor per logical
//! name, owning a slice of durable state and a set of live stream connections.
//!
//! ## Why Actors for Stateful Objects?
//!
//! An object like a shared greeting, a chat room or a counter is mutated from two
//! directions at once: request/response calls (HTTP) and long-lived streams
//! (WebSocket). Running the object as an actor gives every mutation a single place
//! to happen, one at a time:
//!
//! - **Serialized**: calls, stream callbacks and timers share one mailbox.
//! - **Durable**: state lives behind a [`DurableStore`]; the in-memory instance can
//!   be dropped and rebuilt at any time.
//! - **Fan-out**: each instance owns a [`ConnectionRegistry`] and broadcasts to it
//!   without locks.
//!
//! **Further Reading**:
//! - [Actors in Rust](https://ryhl.io/blog/actors-with-tokio/) - Practical guide to implementing actors with Tokio
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ObjectEntity`]) - Your business logic
//! 2. **Runtime Layer** ([`ObjectActor`], [`ObjectContext`], [`TimerQueue`]) - Mailbox processing
//! 3. **Interface Layer** ([`ObjectClient`], [`ObjectStub`]) - Type-safe communication
//! 4. **Addressing** ([`ObjectNamespace`]) - Construct-or-resume by name
//! 5. **Persistence** ([`DurableStore`], [`ObjectStorage`]) - The durable boundary
//!
//! ## Example
//!
//! ```rust
//! use object_framework::{ObjectContext, ObjectEntity, ObjectNamespace, ConnectionId, InboundFrame, MemoryStore};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct Counter;
//!
//! #[derive(Debug)]
//! enum CounterAction { Bump }
//!
//! #[async_trait]
//! impl ObjectEntity for Counter {
//!     type Action = CounterAction;
//!     type ActionResult = u64;
//!     type Deferred = ();
//!     type Error = object_framework::StoreError;
//!
//!     async fn handle_action(&mut self, _: CounterAction, ctx: &mut ObjectContext<Self>) -> Result<u64, Self::Error> {
//!         let next = ctx.storage().get_or("count", "0").await?.parse::<u64>().unwrap_or(0) + 1;
//!         ctx.storage().put("count", &next.to_string()).await?;
//!         Ok(next)
//!     }
//!
//!     async fn on_message(&mut self, _: ConnectionId, _: InboundFrame, _: &mut ObjectContext<Self>) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let namespace = ObjectNamespace::new(Arc::new(MemoryStore::new()), |_| Counter, 8);
//!     let client = namespace.get("counter");
//!     assert_eq!(client.call(CounterAction::Bump).await.unwrap(), 1);
//!     assert_eq!(client.call(CounterAction::Bump).await.unwrap(), 2);
//!     namespace.shutdown().await.unwrap();
//! }
//! ```

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod connection;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod namespace;
pub mod store;
pub mod timer;
pub mod tracing;

pub use actor::ObjectActor;
pub use client::ObjectClient;
pub use client_trait::ObjectStub;
pub use connection::{
    CloseEvent, ConnectionId, ConnectionReceiver, ConnectionRegistry, ConnectionSender,
    InboundFrame, OutboundFrame,
};
pub use entity::{ObjectContext, ObjectEntity};
pub use error::{FrameworkError, SendError, StoreError};
pub use message::{ObjectRequest, Response};
pub use namespace::ObjectNamespace;
pub use store::{DurableStore, FileStore, MemoryStore, ObjectStorage};
pub use timer::TimerQueue;
