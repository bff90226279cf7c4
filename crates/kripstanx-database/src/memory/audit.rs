//! In-memory audit log.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use kripstanx_core::result::AppResult;
use kripstanx_entity::{AuditEvent, AuditEventType};

use crate::repositories::AuditEventRepository;

/// Audit log held in an append-only vector.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditEventRepository {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl MemoryAuditEventRepository {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditEventRepository for MemoryAuditEventRepository {
    async fn append(
        &self,
        principal: &str,
        event_type: AuditEventType,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<AuditEvent> {
        let event = AuditEvent::new(principal, event_type, occurred_at);
        self.events.lock().await.push(event.clone());
        Ok(event)
    }

    async fn last_n(
        &self,
        principal: &str,
        event_type: Option<AuditEventType>,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>> {
        let events = self.events.lock().await;
        let mut matching: Vec<AuditEvent> = events
            .iter()
            .filter(|e| e.principal.eq_ignore_ascii_case(principal))
            .filter(|e| event_type.is_none_or(|t| e.is(t)))
            .cloned()
            .collect();
        // Same order as the SQL store: time, then the time-ordered id.
        matching.sort_by(|a, b| (b.occurred_at, b.id).cmp(&(a.occurred_at, a.id)));
        matching.truncate(limit);
        Ok(matching)
    }
}
