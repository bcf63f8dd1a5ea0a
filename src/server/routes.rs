//! Request/response routes. Each one is a single call on the greeter.

use super::ApiError;
use crate::greeter::{Flavor, BASIC_REPLY};
use crate::lifecycle::GreeterSystem;
use axum::extract::{Query, State};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct HelloParams {
    pub name: Option<String>,
}

/// `GET /?name=<n>`
///
/// The presence flavor falls back to the persisted name; the basic flavor has none
/// and defaults to `world`.
pub async fn say_hello(
    State(system): State<Arc<GreeterSystem>>,
    Query(params): Query<HelloParams>,
) -> Result<String, ApiError> {
    let name = match system.flavor() {
        Flavor::Presence => params.name,
        Flavor::Basic => Some(
            params
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| BASIC_REPLY.to_string()),
        ),
    };
    Ok(system.object().say_hello(name).await?)
}

/// `GET /greeting`
pub async fn get_greeting(State(system): State<Arc<GreeterSystem>>) -> Result<String, ApiError> {
    Ok(system.object().get_greeting().await?)
}

/// `POST /greeting` with the new greeting as the raw body.
pub async fn set_greeting(
    State(system): State<Arc<GreeterSystem>>,
    body: String,
) -> Result<String, ApiError> {
    system.object().set_greeting(body.clone()).await?;
    Ok(format!("Set greeting to \"{body}\""))
}

/// `POST /name` with the new name as the raw body.
pub async fn set_name(
    State(system): State<Arc<GreeterSystem>>,
    body: String,
) -> Result<String, ApiError> {
    system.object().set_name(body.clone()).await?;
    Ok(format!("Set name to \"{body}\""))
}
