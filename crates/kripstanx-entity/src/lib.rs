//! # kripstanx-entity
//!
//! Domain entity models shared by the store implementations, the session
//! core and the HTTP layer.

pub mod audit;
pub mod user;

pub use audit::{AuditEvent, AuditEventType};
pub use user::{UserRecord, UserSessionState};
