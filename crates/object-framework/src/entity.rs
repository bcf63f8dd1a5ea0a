//! # Object Entity Trait
//!
//! [`ObjectEntity`] is the contract between your business logic and the
//! [`ObjectActor`](crate::actor::ObjectActor) that runs it. The actor owns the
//! mailbox, the connection registry, the timers and the storage handle; the entity
//! only decides what to do with each request, through an [`ObjectContext`].

use crate::connection::{CloseEvent, ConnectionId, ConnectionRegistry, InboundFrame};
use crate::store::ObjectStorage;
use crate::timer::TimerQueue;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait that any stateful object must implement to be run by an `ObjectActor`.
///
/// # Architecture Note
/// The associated types pin down what may be sent to the object. An object that
/// takes `GreeterAction` can't be handed anything else, and the reply type of
/// every call is fixed at compile time.
///
/// # Provided Methods (Hooks)
/// Only [`handle_action`](ObjectEntity::handle_action) and
/// [`on_message`](ObjectEntity::on_message) are required. The remaining stream and
/// timer hooks default to doing nothing.
///
/// # Async & Context
/// Every hook receives `&mut ObjectContext<Self>`. Hooks may await storage I/O; the
/// actor won't start the next request until the current hook returns.
#[async_trait]
pub trait ObjectEntity: Send + Sized + 'static {
    /// Request/response operations understood by this object.
    type Action: Send + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Debug;

    /// Work scheduled on the object's own timer queue.
    type Deferred: Send + Debug + 'static;

    /// The error type for this object.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Reason sent in the close frame whenever the object closes a connection.
    const CLOSE_REASON: &'static str = "Object is closing stream";

    /// Handle a request/response action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<Self::ActionResult, Self::Error>;

    /// Called after a new connection has been registered.
    async fn on_accept(
        &mut self,
        _id: ConnectionId,
        _ctx: &mut ObjectContext<Self>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for every inbound frame on a registered connection.
    async fn on_message(
        &mut self,
        id: ConnectionId,
        frame: InboundFrame,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<(), Self::Error>;

    /// Called once a connection has been closed and removed from the registry.
    ///
    /// Never called twice for the same connection.
    async fn on_close(
        &mut self,
        _id: ConnectionId,
        _event: &CloseEvent,
        _ctx: &mut ObjectContext<Self>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when a task scheduled on the timer queue comes due.
    async fn on_deferred(
        &mut self,
        _task: Self::Deferred,
        _ctx: &mut ObjectContext<Self>,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Everything an object instance owns besides the entity itself.
pub struct ObjectContext<T: ObjectEntity> {
    name: String,
    storage: ObjectStorage,
    connections: ConnectionRegistry,
    timers: TimerQueue<T>,
}

impl<T: ObjectEntity> ObjectContext<T> {
    pub(crate) fn new(name: String, storage: ObjectStorage, timers: TimerQueue<T>) -> Self {
        Self {
            name,
            storage,
            connections: ConnectionRegistry::new(),
            timers,
        }
    }

    /// The logical name this instance was resolved by.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &ObjectStorage {
        &self.storage
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut ConnectionRegistry {
        &mut self.connections
    }

    pub fn timers(&mut self) -> &mut TimerQueue<T> {
        &mut self.timers
    }
}
