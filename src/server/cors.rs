//! Cross-origin policy, built from [`CorsConfig`].

use crate::config::{ConfigError, CorsConfig};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub fn layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| ConfigError::InvalidCors(format!("origin {origin:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let methods = config
        .allowed_methods
        .iter()
        .map(|method| {
            Method::from_bytes(method.as_bytes())
                .map_err(|_| ConfigError::InvalidCors(format!("method {method:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let headers = config
        .allowed_headers
        .iter()
        .map(|header| {
            HeaderName::from_bytes(header.as_bytes())
                .map_err(|_| ConfigError::InvalidCors(format!("header {header:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_builds() {
        assert!(layer(&CorsConfig::default()).is_ok());
    }

    #[test]
    fn bad_header_is_rejected() {
        let config = CorsConfig {
            allowed_headers: vec!["Not A Header".to_string()],
            ..CorsConfig::default()
        };
        assert!(matches!(layer(&config), Err(ConfigError::InvalidCors(_))));
    }
}
