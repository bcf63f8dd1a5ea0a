//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for the whole process.
//!
//! Every object logs with an `object` field (the logical name it was resolved by)
//! and, for stream events, a `connection` field. Client methods are wrapped in
//! `#[instrument]` spans, so a request shows up as a hierarchy:
//!
//! ```text
//! INFO Object started object="foo"
//! INFO set_greeting{value="Hi"}: Persisted greeting object="foo"
//! INFO Accepted object="foo" connection=conn_1 users=1
//! INFO Closed object="foo" connection=conn_1 users=0
//! ```
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run      # Lifecycle and mutations
//! RUST_LOG=debug cargo run     # Every request, frame and deferred task
//! RUST_LOG=object_framework=debug,greeter_object=info cargo run
//! ```
//!
//! The compact format hides the module prefix (`with_target(false)`); the structured
//! fields already say which object and connection a line is about.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
