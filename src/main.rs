//! # Greeter Object Server
//!
//! Serves one greeter object over HTTP and WebSocket until Ctrl+C, then closes every
//! stream and exits.
//!
//! ```bash
//! RUST_LOG=info greeter-object --listen 0.0.0.0:8787 --data data/greeter.json
//! GREETER_FLAVOR=basic greeter-object
//! ```

use clap::Parser;
use greeter_object::config::Cli;
use greeter_object::lifecycle::GreeterSystem;
use greeter_object::server;
use object_framework::tracing::setup_tracing;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = Cli::parse().into_config().map_err(|e| e.to_string())?;

    let system = GreeterSystem::from_config(&config)
        .await
        .map(Arc::new)
        .map_err(|e| e.to_string())?;
    let app = server::router(system.clone(), &config.cors).map_err(|e| e.to_string())?;

    let listener = TcpListener::bind(config.server.listen)
        .await
        .map_err(|e| format!("Could not bind {}: {e}", config.server.listen))?;
    info!(
        listen = %config.server.listen,
        object = system.object_name(),
        flavor = ?system.flavor(),
        "Serving greeter"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = &served {
        error!(error = %e, "Server failed");
    }

    // Shutdown system gracefully
    system.shutdown().await?;
    served.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Could not listen for Ctrl+C");
            std::future::pending::<()>().await
        }
    }
}
