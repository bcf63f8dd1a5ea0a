//! # Greeter Object
//!
//! > **A single durable greeter, shared over HTTP and WebSocket.**
//!
//! One stateful object holds a greeting template and a name. HTTP requests read and
//! change them; WebSocket clients are told about every change as it happens, and (in
//! the presence flavor) how many of them are connected.
//!
//! ## Design
//!
//! The object is an actor built on [`object_framework`]: calls, stream events and
//! timers all go through one mailbox, so the object never needs a lock and observers
//! see mutations in the order they were made. State lives in a
//! [`DurableStore`](object_framework::DurableStore), so an instance can be torn down
//! and resumed by name without losing the greeting.
//!
//! ## Module Tour
//!
//! ### 1. The Object ([`greeter`])
//! - **Role**: The [`ObjectEntity`](object_framework::ObjectEntity) implementation: storage
//!   keys, defaults, broadcasts.
//! - **Key items**: [`Greeter`](greeter::Greeter), [`Flavor`](greeter::Flavor),
//!   [`ServerMessage`](greeter::ServerMessage).
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: Wraps the generic `ObjectClient` in a typed [`GreeterClient`](clients::GreeterClient).
//!
//! ### 3. The Orchestrator ([`lifecycle`])
//! - **Role**: Opens the store, owns the namespace, resolves the fixed object name.
//! - **Key items**: [`GreeterSystem`](lifecycle::GreeterSystem).
//!
//! ### 4. The Front Door ([`server`])
//! - **Role**: The axum router: `/ws`, `/`, `/greeting`, `/name`, plus CORS.
//!
//! ### 5. Settings ([`config`])
//! - **Role**: Defaults, TOML file and CLI flags merged into one [`Config`](config::Config).
//!
//! ## Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run -- --listen 127.0.0.1:8787
//! curl -X POST localhost:8787/greeting -d 'Hi'
//! curl 'localhost:8787/?name=Sam'     # Hi, Sam!
//! ```

pub mod clients;
pub mod config;
pub mod greeter;
pub mod lifecycle;
pub mod server;
