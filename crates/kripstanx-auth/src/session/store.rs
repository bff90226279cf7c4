//! Session slot access over the user repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use kripstanx_core::error::AppError;
use kripstanx_database::UserRepository;
use kripstanx_entity::UserSessionState;

/// Reads and replaces a user's session slots.
///
/// Every write is a single replace of all three fields; the read that
/// follows it, from any caller, observes the new state.
#[derive(Clone)]
pub struct UserSessionStore {
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for UserSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSessionStore").finish()
    }
}

impl UserSessionStore {
    /// Creates a store over the given user repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// The user's session slots, or `None` if the user does not exist.
    pub async fn read(&self, username: &str) -> Result<Option<UserSessionState>, AppError> {
        Ok(self
            .users
            .find_by_username(username)
            .await?
            .map(|user| user.session))
    }

    /// Replaces the user's session slots. Returns `false` for an unknown user.
    pub async fn write(&self, username: &str, state: &UserSessionState) -> Result<bool, AppError> {
        self.users.update_session_state(username, state).await
    }

    /// Clears all three slots. Returns `false` for an unknown user.
    pub async fn clear(&self, username: &str) -> Result<bool, AppError> {
        self.write(username, &UserSessionState::default()).await
    }

    /// Drops previous tokens whose grace window closed at or before `now`.
    pub async fn sweep_expired_previous_tokens(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        self.users.clear_expired_previous_tokens(now).await
    }
}
