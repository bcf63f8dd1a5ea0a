use crate::clients::GreeterClient;
use crate::config::{Config, ObjectConfig, StorageBackend};
use crate::greeter::{self, Flavor, Greeter};
use object_framework::{DurableStore, FileStore, MemoryStore, ObjectNamespace, StoreError};
use std::sync::Arc;
use tracing::{error, info};

/// The runtime orchestrator of the greeter service.
///
/// `GreeterSystem` owns the shared store and the namespace the greeter instance lives
/// in. It resolves every request to the same configured object name, so HTTP handlers
/// and WebSocket sessions always reach one instance.
///
/// # Example
///
/// ```rust
/// use greeter_object::config::ObjectConfig;
/// use greeter_object::lifecycle::GreeterSystem;
/// use object_framework::MemoryStore;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let system = GreeterSystem::new(Arc::new(MemoryStore::new()), &ObjectConfig::default());
///     assert_eq!(system.object().get_greeting().await?, "Hello");
///     system.shutdown().await?;
///     Ok(())
/// }
/// ```
pub struct GreeterSystem {
    namespace: ObjectNamespace<Greeter>,
    object_name: String,
    flavor: Flavor,
}

impl GreeterSystem {
    /// Builds the system over an already opened store. No instance is started until
    /// the first [`object`](Self::object) call.
    pub fn new(store: Arc<dyn DurableStore>, config: &ObjectConfig) -> Self {
        let template = Greeter::new(config.flavor, config.recount_delay());
        Self {
            namespace: greeter::namespace(store, template, config.mailbox),
            object_name: config.name.clone(),
            flavor: config.flavor,
        }
    }

    /// Opens the configured store and builds the system over it.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store: Arc<dyn DurableStore> = match config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory store; state is lost on exit");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::File => {
                let store = FileStore::open(config.storage.path.clone()).await?;
                info!(path = %store.path().display(), "Opened file store");
                Arc::new(store)
            }
        };
        Ok(Self::new(store, &config.object))
    }

    /// Client for the greeter instance, starting or resuming it if needed.
    pub fn object(&self) -> GreeterClient {
        GreeterClient::new(self.namespace.get(&self.object_name))
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Tears the instance down. Its streams are closed; the next
    /// [`object`](Self::object) call resumes it from storage.
    pub async fn restart(&self) -> Result<bool, String> {
        self.namespace
            .evict(&self.object_name)
            .await
            .map_err(|e| e.to_string())
    }

    /// Gracefully shuts down the system.
    ///
    /// Every live stream receives a close frame before this returns.
    pub async fn shutdown(&self) -> Result<(), String> {
        info!(object = %self.object_name, "Shutting down system...");
        if let Err(e) = self.namespace.shutdown().await {
            error!(error = %e, "Object task failed");
            return Err(e.to_string());
        }
        info!("System shutdown complete.");
        Ok(())
    }
}
