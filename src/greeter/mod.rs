//! # Greeter Object
//!
//! The one stateful object of this service: a persisted greeting template and name,
//! plus every WebSocket currently watching them.
//!
//! ## Overview
//!
//! Writes arrive over HTTP (`POST /greeting`, `POST /name`) and are fanned out over
//! the streams; streams also poke the object themselves (any inbound message). Both
//! paths end up in the same mailbox, so observers see mutations in the order they
//! were made, and a broadcast never announces a value that isn't durable yet.
//!
//! ## Structure
//!
//! - [`entity`] - [`ObjectEntity`](object_framework::ObjectEntity) implementation for [`Greeter`]
//! - [`actions`] - [`GreeterAction`] / [`GreeterActionResult`] request/response pairs
//! - [`protocol`] - [`ServerMessage`], the JSON payloads pushed to streams
//! - [`error`] - [`GreeterError`] type for type-safe error handling
//! - [`new()`] / [`namespace()`] - Factory functions
//!
//! ## Usage
//!
//! ```rust
//! use greeter_object::greeter::{self, Greeter};
//! use object_framework::MemoryStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = greeter::new("foo", Greeter::default(), Arc::new(MemoryStore::new()));
//!     tokio::spawn(actor.run());
//!
//!     client.set_greeting("Hi".to_string()).await?;
//!     assert_eq!(client.say_hello(Some("Sam".to_string())).await?, "Hi, Sam!");
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;
pub mod protocol;

pub use actions::*;
pub use entity::*;
pub use error::*;
pub use protocol::*;

use crate::clients::GreeterClient;
use object_framework::{DurableStore, ObjectActor, ObjectNamespace, ObjectStorage};
use std::sync::Arc;

/// Mailbox capacity used when none is configured.
pub const DEFAULT_MAILBOX: usize = 32;

/// Creates a standalone Greeter actor and its client.
pub fn new(
    name: &str,
    greeter: Greeter,
    store: Arc<dyn DurableStore>,
) -> (ObjectActor<Greeter>, GreeterClient) {
    let storage = ObjectStorage::new(store, name);
    let (actor, inner) = ObjectActor::new(name, greeter, storage, DEFAULT_MAILBOX);
    (actor, GreeterClient::new(inner))
}

/// Creates a namespace that starts a Greeter, configured like `template`, per name.
pub fn namespace(
    store: Arc<dyn DurableStore>,
    template: Greeter,
    mailbox: usize,
) -> ObjectNamespace<Greeter> {
    ObjectNamespace::new(store, move |_| template.clone(), mailbox)
}
