//! CORS layer configuration.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use kripstanx_core::config::CorsConfig;

use crate::handlers::auth::RESET_KEY_HEADER;

/// Builds a CORS tower layer from configuration.
///
/// The token and reset-key headers are exposed so browser clients can read
/// them from login and renewal responses.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = if config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    layer
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .expose_headers([
            AUTHORIZATION,
            LOCATION,
            HeaderName::from_static(RESET_KEY_HEADER),
        ])
        .max_age(Duration::from_secs(config.max_age_seconds))
}
