//! Username/password check that feeds the audit log.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use kripstanx_core::error::AppError;
use kripstanx_database::{AuditEventRepository, UserRepository};
use kripstanx_entity::{AuditEventType, UserRecord};

use super::hasher::PasswordHasher;

/// Verifies credentials and records the outcome as an audit event.
///
/// Every attempt produces exactly one event: `AUTHENTICATION_SUCCESS` when
/// the user is returned, `AUTHENTICATION_FAILURE` otherwise. Lockout
/// decisions downstream read that history.
#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
    audit: Arc<dyn AuditEventRepository>,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").finish()
    }
}

impl Authenticator {
    /// Creates a new authenticator.
    pub fn new(
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditEventRepository>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            audit,
            hasher,
        }
    }

    /// Returns the user when `password` matches and the account is active.
    ///
    /// Unknown users and wrong passwords fail with `InvalidCredentials`. The
    /// active flag is only consulted once the password matched, so a locked
    /// account is not revealed to someone who does not know its password.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserRecord, AppError> {
        let outcome = self.check(username, password).await;

        let event_type = match &outcome {
            Ok(_) => AuditEventType::AuthenticationSuccess,
            Err(e) if e.is_login_failure() => AuditEventType::AuthenticationFailure,
            Err(_) => return outcome,
        };
        self.audit.append(username, event_type, Utc::now()).await?;

        match &outcome {
            Ok(user) => info!(username = %user.username, "Authentication succeeded"),
            Err(e) => info!(username = %username, reason = %e.kind, "Authentication failed"),
        }
        outcome
    }

    async fn check(&self, username: &str, password: &str) -> Result<UserRecord, AppError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            debug!(username = %username, "Login for unknown user");
            return Err(AppError::invalid_credentials("Bad credentials"));
        };

        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(AppError::invalid_credentials("Bad credentials"));
        }

        if !user.active {
            return Err(AppError::account_disabled(format!(
                "User {} was not activated",
                user.username
            )));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use kripstanx_core::ErrorKind;

    async fn last_event(fx: &Fixture, username: &str) -> String {
        fx.audit.last_n(username, None, 1).await.unwrap()[0].event_type.clone()
    }

    #[tokio::test]
    async fn test_success_records_event() {
        let fx = Fixture::new();
        fx.add_user("alice", "secret", &["ROLE_USER"]).await;

        let user = fx.authenticator.authenticate("ALICE", "secret").await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(last_event(&fx, "alice").await, "AUTHENTICATION_SUCCESS");
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let fx = Fixture::new();
        fx.add_user("alice", "secret", &[]).await;

        let err = fx.authenticator.authenticate("alice", "nope").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
        assert_eq!(last_event(&fx, "alice").await, "AUTHENTICATION_FAILURE");
    }

    #[tokio::test]
    async fn test_unknown_user_is_invalid_credentials() {
        let fx = Fixture::new();
        let err = fx.authenticator.authenticate("ghost", "x").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
        assert_eq!(last_event(&fx, "ghost").await, "AUTHENTICATION_FAILURE");
    }

    #[tokio::test]
    async fn test_locked_account() {
        let fx = Fixture::new();
        fx.add_user("alice", "secret", &[]).await;
        fx.users.set_active("alice", false).await.unwrap();

        let err = fx.authenticator.authenticate("alice", "secret").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountDisabled);

        let err = fx.authenticator.authenticate("alice", "wrong").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCredentials);
    }
}
