use super::actions::{GreeterAction, GreeterActionResult, GreeterTask};
use super::error::GreeterError;
use super::protocol::{ServerMessage, BASIC_REPLY, WELCOME};
use async_trait::async_trait;
use object_framework::{
    CloseEvent, ConnectionId, InboundFrame, ObjectContext, ObjectEntity, SendError,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const NAME_KEY: &str = "name";
pub const GREETING_KEY: &str = "greeting";
pub const DEFAULT_NAME: &str = "World";
pub const DEFAULT_GREETING: &str = "Hello";

/// Delay between a disconnect and the connection recount that follows it.
pub const DEFAULT_RECOUNT_DELAY: Duration = Duration::from_millis(500);

/// Which protocol the greeter speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Persisted name, welcome on connect, live user counts.
    #[default]
    Presence,
    /// Greeting only: no name, no welcome, fixed reply to messages.
    Basic,
}

/// The greeter object.
///
/// State lives entirely in storage (`greeting`, `name`); the struct itself only
/// carries settings, so a restarted instance behaves exactly like the old one
/// minus its connections.
#[derive(Debug, Clone)]
pub struct Greeter {
    flavor: Flavor,
    recount_delay: Duration,
}

impl Default for Greeter {
    fn default() -> Self {
        Self::new(Flavor::default(), DEFAULT_RECOUNT_DELAY)
    }
}

impl Greeter {
    pub fn new(flavor: Flavor, recount_delay: Duration) -> Self {
        Self {
            flavor,
            recount_delay,
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    fn require_presence(&self, operation: &'static str) -> Result<(), GreeterError> {
        match self.flavor {
            Flavor::Presence => Ok(()),
            Flavor::Basic => Err(GreeterError::Unsupported(operation)),
        }
    }

    async fn greeting(ctx: &ObjectContext<Self>) -> Result<String, GreeterError> {
        Ok(ctx
            .storage()
            .get_or(GREETING_KEY, DEFAULT_GREETING)
            .await?)
    }

    async fn name(ctx: &ObjectContext<Self>) -> Result<String, GreeterError> {
        Ok(ctx.storage().get_or(NAME_KEY, DEFAULT_NAME).await?)
    }

    /// `"<greeting>, <name>!"`. An empty `name` counts as not supplied.
    async fn compose(
        &self,
        name: Option<String>,
        ctx: &ObjectContext<Self>,
    ) -> Result<String, GreeterError> {
        let greeting = Self::greeting(ctx).await?;
        let name = match name.filter(|n| !n.is_empty()) {
            Some(name) => name,
            None => match self.flavor {
                Flavor::Presence => Self::name(ctx).await?,
                Flavor::Basic => return Err(GreeterError::MissingName),
            },
        };
        Ok(format!("{greeting}, {name}!"))
    }

    fn broadcast_users(delta: i64, ctx: &mut ObjectContext<Self>) -> Result<usize, GreeterError> {
        let users = (ctx.connections().len() as i64).saturating_add(delta).max(0);
        let users = usize::try_from(users).unwrap_or(usize::MAX);
        let delivered = ctx
            .connections_mut()
            .broadcast(&ServerMessage::Users(users))?;
        debug!(users, delivered, "Broadcast users");
        Ok(users)
    }

    async fn broadcast_hello(&self, ctx: &mut ObjectContext<Self>) -> Result<usize, GreeterError> {
        let message = match self.flavor {
            Flavor::Presence => ServerMessage::Hello(self.compose(None, ctx).await?),
            Flavor::Basic => ServerMessage::Greeting(Self::greeting(ctx).await?),
        };
        let delivered = ctx.connections_mut().broadcast(&message)?;
        debug!(delivered, ?message, "Broadcast hello");
        Ok(delivered)
    }
}

/// A peer that vanished mid-send has already been evicted by the registry; only
/// encoding failures are errors.
fn deliver(result: Result<(), SendError>) -> Result<(), GreeterError> {
    match result {
        Ok(()) | Err(SendError::Gone(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl ObjectEntity for Greeter {
    type Action = GreeterAction;
    type ActionResult = GreeterActionResult;
    type Deferred = GreeterTask;
    type Error = GreeterError;

    const CLOSE_REASON: &'static str = "Greeter object is closing stream";

    async fn handle_action(
        &mut self,
        action: GreeterAction,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<GreeterActionResult, GreeterError> {
        match action {
            GreeterAction::GetGreeting => {
                Ok(GreeterActionResult::GetGreeting(Self::greeting(ctx).await?))
            }
            GreeterAction::GetName => {
                self.require_presence("name")?;
                Ok(GreeterActionResult::GetName(Self::name(ctx).await?))
            }
            GreeterAction::SetGreeting(value) => {
                ctx.storage().put(GREETING_KEY, &value).await?;
                info!(object = ctx.name(), greeting = %value, "Persisted greeting");
                self.broadcast_hello(ctx).await?;
                Ok(GreeterActionResult::SetGreeting(()))
            }
            GreeterAction::SetName(value) => {
                self.require_presence("name")?;
                ctx.storage().put(NAME_KEY, &value).await?;
                info!(object = ctx.name(), name = %value, "Persisted name");
                self.broadcast_hello(ctx).await?;
                Ok(GreeterActionResult::SetName(()))
            }
            GreeterAction::SayHello(name) => {
                Ok(GreeterActionResult::SayHello(self.compose(name, ctx).await?))
            }
            GreeterAction::BroadcastUsers(delta) => Ok(GreeterActionResult::BroadcastUsers(
                Self::broadcast_users(delta, ctx)?,
            )),
            GreeterAction::BroadcastHello => Ok(GreeterActionResult::BroadcastHello(
                self.broadcast_hello(ctx).await?,
            )),
        }
    }

    async fn on_accept(
        &mut self,
        id: ConnectionId,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<(), GreeterError> {
        if self.flavor == Flavor::Presence {
            deliver(
                ctx.connections_mut()
                    .send(id, &ServerMessage::Welcome(WELCOME.to_string())),
            )?;
        }
        Ok(())
    }

    async fn on_message(
        &mut self,
        id: ConnectionId,
        _frame: InboundFrame,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<(), GreeterError> {
        let reply = match self.flavor {
            Flavor::Presence => {
                Self::broadcast_users(0, ctx)?;
                ServerMessage::Hello(self.compose(None, ctx).await?)
            }
            Flavor::Basic => ServerMessage::Hello(BASIC_REPLY.to_string()),
        };
        deliver(ctx.connections_mut().send(id, &reply))
    }

    async fn on_close(
        &mut self,
        _id: ConnectionId,
        _event: &CloseEvent,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<(), GreeterError> {
        if self.flavor == Flavor::Presence {
            ctx.timers()
                .schedule(self.recount_delay, GreeterTask::BroadcastUsers);
        }
        Ok(())
    }

    async fn on_deferred(
        &mut self,
        task: GreeterTask,
        ctx: &mut ObjectContext<Self>,
    ) -> Result<(), GreeterError> {
        match task {
            GreeterTask::BroadcastUsers => Self::broadcast_users(0, ctx).map(|_| ()),
        }
    }
}
