//! PostgreSQL audit event repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kripstanx_core::error::{AppError, ErrorKind};
use kripstanx_core::result::AppResult;
use kripstanx_entity::{AuditEvent, AuditEventType};

use super::AuditEventRepository;

/// Audit log backed by the `audit_events` table.
#[derive(Debug, Clone)]
pub struct PgAuditEventRepository {
    pool: PgPool,
}

impl PgAuditEventRepository {
    /// Create a new audit event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditEventRepository for PgAuditEventRepository {
    async fn append(
        &self,
        principal: &str,
        event_type: AuditEventType,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<AuditEvent> {
        let event = AuditEvent::new(principal, event_type, occurred_at);
        sqlx::query_as::<_, AuditEvent>(
            r#"INSERT INTO audit_events (id, principal, event_type, occurred_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *"#,
        )
        .bind(event.id)
        .bind(&event.principal)
        .bind(&event.event_type)
        .bind(event.occurred_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append audit event", e))
    }

    async fn last_n(
        &self,
        principal: &str,
        event_type: Option<AuditEventType>,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>> {
        sqlx::query_as::<_, AuditEvent>(
            r#"SELECT * FROM audit_events
            WHERE LOWER(principal) = LOWER($1)
              AND ($2::VARCHAR IS NULL OR event_type = $2)
            ORDER BY occurred_at DESC, id DESC
            LIMIT $3"#,
        )
        .bind(principal)
        .bind(event_type.map(|t| t.as_str()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read audit events", e))
    }
}
