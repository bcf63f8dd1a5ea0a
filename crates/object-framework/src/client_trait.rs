//! # ObjectStub Trait
//!
//! Provides a common interface for object‑specific clients, adding default stream
//! lifecycle methods built on top of a generic `ObjectClient`.
use crate::{CloseEvent, ConnectionId, ConnectionSender, FrameworkError, InboundFrame};
use crate::{ObjectClient, ObjectEntity};
use async_trait::async_trait;

/// Trait for object-specific clients to inherit the stream lifecycle operations.
///
/// A domain client only has to say how to reach the generic client and how to turn
/// a [`FrameworkError`] into its own error type. Accepting a stream, forwarding its
/// frames and reporting its close then come for free.
///
/// # Example
///
/// ```rust,ignore
/// #[async_trait]
/// impl ObjectStub<Greeter> for GreeterClient {
///     type Error = GreeterError;
///
///     fn inner(&self) -> &ObjectClient<Greeter> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         GreeterError::from_framework(e)
///     }
/// }
///
/// let id = client.accept_stream(sender).await?;
/// client.stream_message(id, InboundFrame::Text("hi".into())).await?;
/// client.stream_closed(id, CloseEvent::clean(1000, "bye")).await?;
/// ```
#[async_trait]
pub trait ObjectStub<T: ObjectEntity>: Send + Sync {
    /// The object-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ObjectClient.
    fn inner(&self) -> &ObjectClient<T>;

    /// Map framework errors to the specific object error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Register a new stream connection.
    #[tracing::instrument(skip(self, sender))]
    async fn accept_stream(&self, sender: ConnectionSender) -> Result<ConnectionId, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().accept(sender).await.map_err(Self::map_error)
    }

    /// Forward one inbound frame.
    #[tracing::instrument(skip(self, frame))]
    async fn stream_message(&self, id: ConnectionId, frame: InboundFrame) -> Result<(), Self::Error> {
        self.inner().message(id, frame).await.map_err(Self::map_error)
    }

    /// Report that a stream has ended.
    #[tracing::instrument(skip(self))]
    async fn stream_closed(&self, id: ConnectionId, event: CloseEvent) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().close(id, event).await.map_err(Self::map_error)
    }
}
