//! Store interfaces and their PostgreSQL implementations.

pub mod audit;
pub mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use kripstanx_core::result::AppResult;
use kripstanx_entity::{AuditEvent, AuditEventType, UserRecord, UserSessionState};

pub use audit::PgAuditEventRepository;
pub use user::PgUserRepository;

/// Durable store of user records, including their session slots.
///
/// Username lookups are case-insensitive in every implementation. Writes to
/// one user's session state are a single atomic replace; concurrent writers
/// to the same user resolve last-writer-wins.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>>;

    /// Insert the user, or replace the stored record with the same id.
    async fn save(&self, user: &UserRecord) -> AppResult<()>;

    /// Replace the three session fields of one user.
    ///
    /// Returns `false` when no such user exists.
    async fn update_session_state(
        &self,
        username: &str,
        state: &UserSessionState,
    ) -> AppResult<bool>;

    /// Clear `previous_token` and its expiry for every user whose grace
    /// window closed at or before `now`. `current_token` is left untouched.
    ///
    /// Returns the number of users changed.
    async fn clear_expired_previous_tokens(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Set the active flag. Returns `false` when no such user exists.
    async fn set_active(&self, username: &str, active: bool) -> AppResult<bool>;

    /// All users currently holding a current token.
    async fn find_with_active_session(&self) -> AppResult<Vec<UserRecord>>;

    /// Store a password-reset key and the time it was issued.
    async fn set_reset_key(
        &self,
        username: &str,
        reset_key: &str,
        reset_date: DateTime<Utc>,
    ) -> AppResult<bool>;
}

/// Append-only log of authentication events.
#[async_trait]
pub trait AuditEventRepository: Send + Sync + 'static {
    /// Record an event for `principal`.
    async fn append(
        &self,
        principal: &str,
        event_type: AuditEventType,
        occurred_at: DateTime<Utc>,
    ) -> AppResult<AuditEvent>;

    /// The `limit` most recent events for `principal`, newest first,
    /// optionally restricted to one event type.
    async fn last_n(
        &self,
        principal: &str,
        event_type: Option<AuditEventType>,
        limit: usize,
    ) -> AppResult<Vec<AuditEvent>>;
}
