//! # Framework Errors
//!
//! Common error types shared by every object actor and client. Entity-specific
//! failures travel inside [`FrameworkError::EntityError`] so callers can downcast
//! back to the entity's own error type.

use crate::connection::ConnectionId;

/// Errors that can occur within the object framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Object task failed: {0}")]
    TaskFailed(String),
}

impl FrameworkError {
    /// Wraps an entity error.
    pub fn entity<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FrameworkError::EntityError(Box::new(error))
    }

    /// Recovers the entity's own error type, if that is what this error carries.
    pub fn into_entity<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
                Ok(e) => Ok(*e),
                Err(inner) => Err(FrameworkError::EntityError(inner)),
            },
            other => Err(other),
        }
    }
}

/// Errors raised by a [`DurableStore`](crate::store::DurableStore).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing medium refused the operation (offline, quota, injected failure).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Error returned when an outbound frame can't be handed to a connection.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Connection {0} is gone")]
    Gone(ConnectionId),
    #[error("Payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}
