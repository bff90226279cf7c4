//! # kripstanx-api
//!
//! HTTP API layer for KripStanx built on Axum.
//!
//! Provides the login, token renewal, logout and account endpoints, the
//! authentication gate that installs the caller's principal, extractors,
//! DTOs and error mapping.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
