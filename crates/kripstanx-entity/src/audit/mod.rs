//! Authentication audit events.

pub mod model;

pub use model::{AuditEvent, AuditEventType};
