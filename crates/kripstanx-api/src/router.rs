//! Route definitions for the KripStanx HTTP API.
//!
//! All routes are mounted under `/api`. The authentication gate wraps every
//! route, so handlers see the caller's principal in the request extensions.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(account_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::gate::authentication_gate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Login, token renewal, logout
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/authenticate", post(handlers::auth::authenticate))
        .route("/renew-token", post(handlers::auth::renew_token))
        .route("/logout", post(handlers::auth::logout))
}

/// The authenticated caller
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(handlers::account::get_account))
        .route("/keep-alive-session", get(handlers::account::keep_alive))
}

/// Liveness
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
