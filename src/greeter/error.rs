//! Error types for the Greeter object.

use object_framework::{FrameworkError, SendError, StoreError};
use thiserror::Error;

/// Errors that can occur during greeter operations.
#[derive(Debug, Error)]
pub enum GreeterError {
    /// The durable store failed; the operation had no effect and nothing was broadcast.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// An outbound payload could not be encoded.
    #[error("Stream error: {0}")]
    Stream(#[from] SendError),

    /// The operation exists only in the presence flavor.
    #[error("Not supported by this greeter: {0}")]
    Unsupported(&'static str),

    /// The basic flavor has no persisted name to fall back on.
    #[error("A name is required")]
    MissingName,

    /// The object replied with a result that doesn't match the request.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl GreeterError {
    /// Unwraps a greeter error carried by the framework, or reports a communication failure.
    pub fn from_framework(e: FrameworkError) -> Self {
        match e.into_entity::<GreeterError>() {
            Ok(inner) => inner,
            Err(other) => GreeterError::ActorCommunicationError(other.to_string()),
        }
    }
}
