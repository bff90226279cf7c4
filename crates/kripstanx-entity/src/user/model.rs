//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::authority;
use super::session::UserSessionState;

/// A registered user as held by the user-record store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account may log in. Cleared by lockout.
    pub active: bool,
    /// Granted authorities, e.g. `ROLE_USER`.
    pub authorities: Vec<String>,
    /// After this instant the password must be reset before a token is issued.
    pub password_expiration_date: Option<DateTime<Utc>>,
    /// Pending password-reset key.
    #[serde(skip_serializing)]
    pub reset_key: Option<String>,
    /// When the reset key was issued.
    pub reset_date: Option<DateTime<Utc>>,
    /// Session token slots.
    #[sqlx(flatten)]
    #[serde(skip)]
    pub session: UserSessionState,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates an active user with empty session state.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            username: username.into(),
            password_hash: password_hash.into(),
            active: true,
            authorities,
            password_expiration_date: None,
            reset_key: None,
            reset_date: None,
            session: UserSessionState::default(),
            created_at: Utc::now(),
        }
    }

    /// Store key for a username; lookups are case-insensitive.
    pub fn normalize_username(username: &str) -> String {
        username.to_lowercase()
    }

    /// Whether the password has expired at `now`.
    pub fn is_password_expired(&self, now: DateTime<Utc>) -> bool {
        self.password_expiration_date
            .map(|expires| expires < now)
            .unwrap_or(false)
    }

    /// Whether the user holds the given authority.
    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a == name)
    }

    /// Whether the user may write in restricted mode.
    pub fn is_technical(&self) -> bool {
        self.has_authority(authority::TECHNICAL)
    }
}
