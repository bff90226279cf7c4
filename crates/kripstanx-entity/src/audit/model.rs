//! Audit event entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Login outcome recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    /// Credentials were accepted.
    AuthenticationSuccess,
    /// Credentials were rejected.
    AuthenticationFailure,
}

impl AuditEventType {
    /// Return the persisted name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationSuccess => "AUTHENTICATION_SUCCESS",
            Self::AuthenticationFailure => "AUTHENTICATION_FAILURE",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// The username the event is about.
    pub principal: String,
    /// Persisted event type name, see [`AuditEventType`].
    pub event_type: String,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates a new event with a fresh identifier.
    pub fn new(principal: &str, event_type: AuditEventType, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            principal: principal.to_string(),
            event_type: event_type.as_str().to_string(),
            occurred_at,
        }
    }

    /// Whether this event is of the given type.
    pub fn is(&self, event_type: AuditEventType) -> bool {
        self.event_type == event_type.as_str()
    }
}
