//! # Object Actor
//!
//! This module defines the `ObjectActor`, the server half of an object instance.
//! It owns the entity, its storage handle, its connection registry and its timer
//! queue, and processes the mailbox sequentially.

use crate::client::ObjectClient;
use crate::connection::{CloseEvent, ConnectionId};
use crate::entity::{ObjectContext, ObjectEntity};
use crate::error::FrameworkError;
use crate::message::ObjectRequest;
use crate::store::ObjectStorage;
use crate::timer::TimerQueue;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Close code sent to every connection when an instance is torn down.
const GOING_AWAY: u16 = 1001;

/// The actor that runs one object instance.
///
/// **Concurrency Model**:
/// Each instance runs in its own Tokio task and handles exactly one request at a
/// time, hooks included. A hook that awaits storage holds up the mailbox until it
/// returns, so the read, compute, write and broadcast steps of one operation never
/// interleave with another operation. Neither the entity state nor the registry
/// need a lock.
///
/// # Usage Pattern
///
/// ```rust,ignore
/// let storage = ObjectStorage::new(store, "foo");
/// let (actor, client) = ObjectActor::new("foo", Greeter::default(), storage, 32);
/// tokio::spawn(actor.run());
/// let greeting = client.call(GreeterAction::GetGreeting).await?;
/// ```
///
/// Most code doesn't construct actors directly; [`ObjectNamespace`](crate::namespace::ObjectNamespace)
/// does it on first use of a name.
pub struct ObjectActor<T: ObjectEntity> {
    entity: T,
    receiver: mpsc::Receiver<ObjectRequest<T>>,
    ctx: ObjectContext<T>,
}

impl<T: ObjectEntity> ObjectActor<T> {
    /// Creates a new `ObjectActor` and its associated `ObjectClient`.
    ///
    /// # Arguments
    ///
    /// * `name` - The logical name of this instance; used for logging.
    /// * `entity` - The business logic.
    /// * `storage` - Durable storage already scoped to this instance.
    /// * `buffer_size` - Capacity of the mailbox. When full, clients wait for space.
    ///   Zero is treated as one.
    pub fn new(
        name: impl Into<String>,
        entity: T,
        storage: ObjectStorage,
        buffer_size: usize,
    ) -> (Self, ObjectClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let timers = TimerQueue::new(sender.downgrade());
        let actor = Self {
            entity,
            receiver,
            ctx: ObjectContext::new(name.into(), storage, timers),
        };
        (actor, ObjectClient::new(sender))
    }

    /// Runs the mailbox loop until every client is dropped or a shutdown is requested.
    ///
    /// On exit all connections receive a close frame and pending timers are aborted.
    /// Persisted state is untouched.
    pub async fn run(mut self) {
        let object = self.ctx.name().to_string();
        info!(%object, "Object started");

        let mut shutdown_ack = None;
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ObjectRequest::Call { action, respond_to } => {
                    debug!(%object, ?action, "Call");
                    let result = self
                        .entity
                        .handle_action(action, &mut self.ctx)
                        .await
                        .map_err(FrameworkError::entity);
                    if let Err(e) = &result {
                        warn!(%object, error = %e, "Call failed");
                    }
                    let _ = respond_to.send(result);
                }
                ObjectRequest::Accept { sender, respond_to } => {
                    let id = self.ctx.connections_mut().insert(sender);
                    info!(%object, connection = %id, users = self.ctx.connections().len(), "Accepted");
                    let result = self
                        .entity
                        .on_accept(id, &mut self.ctx)
                        .await
                        .map(|_| id)
                        .map_err(FrameworkError::entity);
                    if let Err(e) = &result {
                        warn!(%object, connection = %id, error = %e, "on_accept failed");
                    }
                    let _ = respond_to.send(result);
                }
                ObjectRequest::Message {
                    id,
                    frame,
                    respond_to,
                } => {
                    if !self.ctx.connections().contains(id) {
                        debug!(%object, connection = %id, "Message from unregistered connection ignored");
                        let _ = respond_to.send(Ok(()));
                        continue;
                    }
                    debug!(%object, connection = %id, len = frame.len(), "Message");
                    let result = self
                        .entity
                        .on_message(id, frame, &mut self.ctx)
                        .await
                        .map_err(FrameworkError::entity);
                    if let Err(e) = &result {
                        warn!(%object, connection = %id, error = %e, "on_message failed");
                    }
                    let _ = respond_to.send(result);
                }
                ObjectRequest::Close {
                    id,
                    event,
                    respond_to,
                } => {
                    let result = self.close(id, event).await;
                    let _ = respond_to.send(result);
                }
                ObjectRequest::Deferred { task } => {
                    debug!(%object, ?task, "Deferred");
                    if let Err(e) = self.entity.on_deferred(task, &mut self.ctx).await {
                        warn!(%object, error = %e, "Deferred task failed");
                    }
                }
                ObjectRequest::Shutdown { respond_to } => {
                    shutdown_ack = Some(respond_to);
                    break;
                }
            }
        }

        self.receiver.close();
        self.ctx.timers().cancel_all();
        let closed = self
            .ctx
            .connections_mut()
            .close_all(GOING_AWAY, T::CLOSE_REASON);
        info!(%object, closed, "Shutdown");

        if let Some(ack) = shutdown_ack {
            let _ = ack.send(());
        }
    }

    async fn close(
        &mut self,
        id: ConnectionId,
        event: CloseEvent,
    ) -> Result<(), FrameworkError> {
        let object = self.ctx.name().to_string();
        debug!(
            %object,
            connection = %id,
            code = event.code,
            reason = %event.reason,
            was_clean = event.was_clean,
            "Close"
        );

        if !self
            .ctx
            .connections_mut()
            .close(id, event.reply_code(), T::CLOSE_REASON)
        {
            debug!(%object, connection = %id, "Already closed");
            return Ok(());
        }
        info!(%object, connection = %id, users = self.ctx.connections().len(), "Closed");

        self.entity
            .on_close(id, &event, &mut self.ctx)
            .await
            .map_err(|e| {
                warn!(%object, connection = %id, error = %e, "on_close failed");
                FrameworkError::entity(e)
            })
    }
}
