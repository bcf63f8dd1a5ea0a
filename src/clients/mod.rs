//! Type-safe wrappers around [`ObjectClient`](object_framework::ObjectClient).

pub mod greeter_client;

pub use greeter_client::*;
