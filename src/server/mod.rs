//! # HTTP Front Door
//!
//! The axum router in front of the greeter object. Every route resolves the same
//! object through [`GreeterSystem::object`] and forwards one typed call to it.
//!
//! | Route | Handler | Notes |
//! |---|---|---|
//! | `GET /ws` | [`ws::upgrade`] | `426` unless `Upgrade: websocket` |
//! | `GET /` | [`routes::say_hello`] | `?name=` |
//! | `GET /greeting` | [`routes::get_greeting`] | |
//! | `POST /greeting` | [`routes::set_greeting`] | body is the new greeting |
//! | `POST /name` | [`routes::set_name`] | presence flavor only |
//!
//! Status codes come from [`ApiError`]. The CORS policy wraps every route except `/ws`.

pub mod cors;
pub mod error;
pub mod routes;
pub mod ws;

pub use error::ApiError;

use crate::config::{ConfigError, CorsConfig};
use crate::greeter::Flavor;
use crate::lifecycle::GreeterSystem;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Builds the full router. CORS applies to the HTTP routes only, not to `/ws`.
pub fn router(system: Arc<GreeterSystem>, cors: &CorsConfig) -> Result<Router, ConfigError> {
    let mut http = Router::new().route("/", get(routes::say_hello)).route(
        "/greeting",
        get(routes::get_greeting).post(routes::set_greeting),
    );
    if system.flavor() == Flavor::Presence {
        http = http.route("/name", post(routes::set_name));
    }
    Ok(Router::new()
        .route("/ws", get(ws::upgrade))
        .merge(http.layer(cors::layer(cors)?))
        .with_state(system))
}
