//! The login flow.

pub mod manager;

pub use manager::{LoginManager, LoginOutcome};
