//! # Greeter Client
//!
//! Provides a high‑level API for interacting with the `Greeter` object.
//! It wraps an `ObjectClient<Greeter>` and exposes domain‑specific methods.
use crate::greeter::{Greeter, GreeterAction, GreeterActionResult, GreeterError};
use async_trait::async_trait;
use object_framework::{FrameworkError, ObjectClient, ObjectStub};
use tracing::{debug, instrument};

/// Client for interacting with the Greeter object.
#[derive(Clone)]
pub struct GreeterClient {
    inner: ObjectClient<Greeter>,
}

impl GreeterClient {
    pub fn new(inner: ObjectClient<Greeter>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ObjectStub<Greeter> for GreeterClient {
    type Error = GreeterError;

    fn inner(&self) -> &ObjectClient<Greeter> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        GreeterError::from_framework(e)
    }
}

fn unexpected(result: GreeterActionResult) -> GreeterError {
    GreeterError::UnexpectedReply(format!("{result:?}"))
}

impl GreeterClient {
    async fn call(&self, action: GreeterAction) -> Result<GreeterActionResult, GreeterError> {
        self.inner
            .call(action)
            .await
            .map_err(GreeterError::from_framework)
    }

    #[instrument(skip(self))]
    pub async fn get_greeting(&self) -> Result<String, GreeterError> {
        debug!("Sending request");
        match self.call(GreeterAction::GetGreeting).await? {
            GreeterActionResult::GetGreeting(greeting) => Ok(greeting),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn get_name(&self) -> Result<String, GreeterError> {
        debug!("Sending request");
        match self.call(GreeterAction::GetName).await? {
            GreeterActionResult::GetName(name) => Ok(name),
            other => Err(unexpected(other)),
        }
    }

    /// Persists a new greeting and broadcasts it.
    ///
    /// Returns only after the write is durable. On a storage error nothing was broadcast.
    #[instrument(skip(self))]
    pub async fn set_greeting(&self, value: String) -> Result<(), GreeterError> {
        debug!("Sending request");
        match self.call(GreeterAction::SetGreeting(value)).await? {
            GreeterActionResult::SetGreeting(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Persists a new name and broadcasts the composed greeting.
    #[instrument(skip(self))]
    pub async fn set_name(&self, value: String) -> Result<(), GreeterError> {
        debug!("Sending request");
        match self.call(GreeterAction::SetName(value)).await? {
            GreeterActionResult::SetName(()) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn say_hello(&self, name: Option<String>) -> Result<String, GreeterError> {
        debug!("Sending request");
        match self.call(GreeterAction::SayHello(name)).await? {
            GreeterActionResult::SayHello(hello) => Ok(hello),
            other => Err(unexpected(other)),
        }
    }

    /// Announces the connection count plus `delta` to every connection.
    #[instrument(skip(self))]
    pub async fn broadcast_users(&self, delta: i64) -> Result<usize, GreeterError> {
        match self.call(GreeterAction::BroadcastUsers(delta)).await? {
            GreeterActionResult::BroadcastUsers(users) => Ok(users),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn broadcast_hello(&self) -> Result<usize, GreeterError> {
        match self.call(GreeterAction::BroadcastHello).await? {
            GreeterActionResult::BroadcastHello(delivered) => Ok(delivered),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_framework::mock::{create_mock_client, expect_call};
    use object_framework::StoreError;

    #[tokio::test]
    async fn test_get_greeting_unwraps_result() {
        let (client, mut receiver) = create_mock_client::<Greeter>(10);
        let greeter_client = GreeterClient::new(client);

        let task = tokio::spawn(async move { greeter_client.get_greeting().await });

        let (action, responder) = expect_call(&mut receiver)
            .await
            .expect("Expected Call request");
        assert!(matches!(action, GreeterAction::GetGreeting));
        responder
            .send(Ok(GreeterActionResult::GetGreeting("Hi".into())))
            .unwrap();

        assert_eq!(task.await.unwrap().unwrap(), "Hi");
    }

    #[tokio::test]
    async fn test_storage_error_is_recovered_from_framework() {
        let (client, mut receiver) = create_mock_client::<Greeter>(10);
        let greeter_client = GreeterClient::new(client);

        let task =
            tokio::spawn(async move { greeter_client.set_greeting("Hi".to_string()).await });

        let (action, responder) = expect_call(&mut receiver).await.unwrap();
        assert!(matches!(action, GreeterAction::SetGreeting(ref v) if v == "Hi"));
        responder
            .send(Err(FrameworkError::entity(GreeterError::Storage(
                StoreError::Unavailable("quota".into()),
            ))))
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, GreeterError::Storage(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_mismatched_reply_is_an_error() {
        let (client, mut receiver) = create_mock_client::<Greeter>(10);
        let greeter_client = GreeterClient::new(client);

        let task = tokio::spawn(async move { greeter_client.get_name().await });

        let (_, responder) = expect_call(&mut receiver).await.unwrap();
        responder
            .send(Ok(GreeterActionResult::SetName(())))
            .unwrap();

        assert!(matches!(
            task.await.unwrap(),
            Err(GreeterError::UnexpectedReply(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_object_is_communication_error() {
        let (client, receiver) = create_mock_client::<Greeter>(10);
        drop(receiver);
        let greeter_client = GreeterClient::new(client);

        assert!(matches!(
            greeter_client.get_greeting().await,
            Err(GreeterError::ActorCommunicationError(_))
        ));
    }
}
