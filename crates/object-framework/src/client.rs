//! # Generic Client
//!
//! This module defines the generic client for communicating with object instances.

use crate::connection::{CloseEvent, ConnectionId, ConnectionSender, InboundFrame};
use crate::entity::ObjectEntity;
use crate::error::FrameworkError;
use crate::message::ObjectRequest;
use tokio::sync::{mpsc, oneshot};

/// ## ObjectClient
///
/// The `ObjectClient<T>` provides a type‑safe, async API for interacting with an
/// `ObjectActor<T>`. It forwards calls and stream lifecycle events over a Tokio mpsc
/// channel and returns results via oneshot channels. Cloning only clones the sender.
pub struct ObjectClient<T: ObjectEntity> {
    sender: mpsc::Sender<ObjectRequest<T>>,
}

impl<T: ObjectEntity> Clone for ObjectClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ObjectEntity> ObjectClient<T> {
    pub fn new(sender: mpsc::Sender<ObjectRequest<T>>) -> Self {
        Self { sender }
    }

    /// Whether the instance behind this client has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, FrameworkError>>) -> ObjectRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn call(&self, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ObjectRequest::Call { action, respond_to })
            .await
    }

    /// Registers a stream with the instance. Frames for it arrive on the receiving
    /// half of `sender`.
    pub async fn accept(&self, sender: ConnectionSender) -> Result<ConnectionId, FrameworkError> {
        self.request(|respond_to| ObjectRequest::Accept { sender, respond_to })
            .await
    }

    pub async fn message(
        &self,
        id: ConnectionId,
        frame: InboundFrame,
    ) -> Result<(), FrameworkError> {
        self.request(|respond_to| ObjectRequest::Message {
            id,
            frame,
            respond_to,
        })
        .await
    }

    pub async fn close(&self, id: ConnectionId, event: CloseEvent) -> Result<(), FrameworkError> {
        self.request(|respond_to| ObjectRequest::Close {
            id,
            event,
            respond_to,
        })
        .await
    }

    /// Asks the instance to tear down and waits until it has.
    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ObjectRequest::Shutdown { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }
}
