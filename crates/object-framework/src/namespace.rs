//! # Object Namespace
//!
//! Addressing of object instances by logical name. The first [`get`](ObjectNamespace::get)
//! for a name spawns an instance; later calls return a client for that same instance.
//! If the instance has stopped in the meantime (evicted, or its task died), the next
//! `get` spawns a fresh one over the same storage scope. That fresh instance sees all
//! persisted state but starts with no connections and no timers.

use crate::actor::ObjectActor;
use crate::client::ObjectClient;
use crate::entity::ObjectEntity;
use crate::error::FrameworkError;
use crate::store::{DurableStore, ObjectStorage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

struct Instance<T: ObjectEntity> {
    client: ObjectClient<T>,
    handle: JoinHandle<()>,
}

impl<T: ObjectEntity> Instance<T> {
    fn is_live(&self) -> bool {
        !self.client.is_closed() && !self.handle.is_finished()
    }
}

/// Lazily constructs-or-resumes one instance per name.
pub struct ObjectNamespace<T: ObjectEntity> {
    store: Arc<dyn DurableStore>,
    factory: Box<dyn Fn(&str) -> T + Send + Sync>,
    buffer_size: usize,
    instances: Mutex<HashMap<String, Instance<T>>>,
}

impl<T: ObjectEntity> ObjectNamespace<T> {
    /// # Arguments
    ///
    /// * `store` - Shared durable store; each instance gets a view scoped to its name.
    /// * `factory` - Builds the entity for a name whenever an instance is (re)started.
    /// * `buffer_size` - Mailbox capacity of each instance.
    pub fn new(
        store: Arc<dyn DurableStore>,
        factory: impl Fn(&str) -> T + Send + Sync + 'static,
        buffer_size: usize,
    ) -> Self {
        Self {
            store,
            factory: Box::new(factory),
            buffer_size,
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Returns a client for the instance named `name`, starting it if needed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn get(&self, name: &str) -> ObjectClient<T> {
        let mut instances = self.instances.lock();
        if let Some(instance) = instances.get(name) {
            if instance.is_live() {
                return instance.client.clone();
            }
            info!(object = name, "Instance stopped, resuming");
        }

        let storage = ObjectStorage::new(self.store.clone(), name);
        let entity = (self.factory)(name);
        let (actor, client) = ObjectActor::new(name, entity, storage, self.buffer_size);
        let handle = tokio::spawn(actor.run());
        instances.insert(
            name.to_string(),
            Instance {
                client: client.clone(),
                handle,
            },
        );
        client
    }

    /// Names of the instances currently running.
    pub fn live(&self) -> Vec<String> {
        let instances = self.instances.lock();
        let mut names: Vec<String> = instances
            .iter()
            .filter(|(_, instance)| instance.is_live())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Tears down the instance named `name`. Returns `false` if none was running.
    ///
    /// Connections are closed and pending timers cancelled; persisted state is kept.
    pub async fn evict(&self, name: &str) -> Result<bool, FrameworkError> {
        let instance = self.instances.lock().remove(name);
        let Some(instance) = instance else {
            return Ok(false);
        };
        info!(object = name, "Evicting instance");
        Self::stop(name, instance).await?;
        Ok(true)
    }

    /// Tears down every instance.
    ///
    /// # Shutdown Process
    ///
    /// Each instance is asked to shut down explicitly rather than relying on channel
    /// closure, because stream sessions hold their own client clones.
    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        info!("Shutting down namespace...");
        let instances: Vec<(String, Instance<T>)> = self.instances.lock().drain().collect();
        for (name, instance) in instances {
            Self::stop(&name, instance).await?;
        }
        info!("Namespace shutdown complete.");
        Ok(())
    }

    async fn stop(name: &str, instance: Instance<T>) -> Result<(), FrameworkError> {
        // An instance that already stopped has nothing left to acknowledge.
        let _ = instance.client.shutdown().await;
        if let Err(e) = instance.handle.await {
            error!(object = name, "Object task failed: {:?}", e);
            return Err(FrameworkError::TaskFailed(format!("{name}: {e}")));
        }
        Ok(())
    }
}
