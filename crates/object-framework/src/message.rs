//! # Object Mailbox Messages
//!
//! Every interaction with an object instance, whichever transport it came from,
//! is turned into one [`ObjectRequest`] and queued on the instance's mailbox. The
//! instance drains the mailbox one request at a time, which is what serializes
//! request/response calls, stream callbacks and deferred timers against each other.

use crate::connection::{CloseEvent, ConnectionId, ConnectionSender, InboundFrame};
use crate::entity::ObjectEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by objects.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to an object instance.
///
/// - **Call**: a request/response operation, carrying the entity's own [`ObjectEntity::Action`].
/// - **Accept / Message / Close**: the stream lifecycle of one connection.
/// - **Deferred**: a timer scheduled by the instance itself has fired.
/// - **Shutdown**: tear the instance down (connections closed, timers cancelled).
#[derive(Debug)]
pub enum ObjectRequest<T: ObjectEntity> {
    Call {
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Accept {
        sender: ConnectionSender,
        respond_to: Response<ConnectionId>,
    },
    Message {
        id: ConnectionId,
        frame: InboundFrame,
        respond_to: Response<()>,
    },
    Close {
        id: ConnectionId,
        event: CloseEvent,
        respond_to: Response<()>,
    },
    Deferred {
        task: T::Deferred,
    },
    Shutdown {
        respond_to: oneshot::Sender<()>,
    },
}
