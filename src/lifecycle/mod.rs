//! # System Lifecycle
//!
//! Wiring between configuration and the running object.
//!
//! The object framework already knows how to start, resume and stop one instance per
//! name. What this module adds is the deployment-level decisions:
//!
//! 1. **Store selection** - memory or file, from [`StorageConfig`](crate::config::StorageConfig)
//! 2. **Addressing** - every request goes to one fixed object name
//! 3. **Graceful shutdown** - tear the instance down so streams get a close frame
//!
//! ```rust,ignore
//! let system = GreeterSystem::from_config(&config).await?;
//! let client = system.object();
//! client.set_greeting("Hi".to_string()).await?;
//! system.shutdown().await?;
//! ```

pub mod greeter_system;

pub use greeter_system::GreeterSystem;
