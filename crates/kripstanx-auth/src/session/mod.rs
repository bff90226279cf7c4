//! Session state storage and the token rotation protocol.

pub mod service;
pub mod store;

pub use service::SessionService;
pub use store::UserSessionStore;
