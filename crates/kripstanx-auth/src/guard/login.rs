//! Inactivity and failed-attempt lockout decisions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use kripstanx_core::config::SecurityConfig;
use kripstanx_core::error::AppError;
use kripstanx_database::AuditEventRepository;
use kripstanx_entity::AuditEventType;

use crate::session::SessionService;

/// Decides from the audit history whether an account must be locked.
///
/// History is read fresh on every call, so a single success between
/// failures resets the failed-attempt count.
#[derive(Clone)]
pub struct LoginGuard {
    audit: Arc<dyn AuditEventRepository>,
    sessions: Arc<SessionService>,
    /// Longest allowed gap between two successful logins.
    inactivity_period: Duration,
    /// Consecutive failures that lock the account.
    failed_attempt_threshold: usize,
}

impl std::fmt::Debug for LoginGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginGuard")
            .field("inactivity_period", &self.inactivity_period)
            .field("failed_attempt_threshold", &self.failed_attempt_threshold)
            .finish()
    }
}

impl LoginGuard {
    /// Creates a guard with the configured lockout thresholds.
    pub fn new(
        audit: Arc<dyn AuditEventRepository>,
        sessions: Arc<SessionService>,
        config: &SecurityConfig,
    ) -> Result<Self, AppError> {
        let inactivity_period = i64::try_from(config.inactivity_period_days)
            .ok()
            .and_then(Duration::try_days)
            .ok_or_else(|| {
                AppError::configuration(format!(
                    "security.inactivity_period_days is out of range: {}",
                    config.inactivity_period_days
                ))
            })?;

        Ok(Self {
            audit,
            sessions,
            inactivity_period,
            failed_attempt_threshold: config.failed_attempt_threshold,
        })
    }

    /// Locks the account if the user had been away too long before this login.
    ///
    /// The newest success is the login being evaluated, so the gap is
    /// measured from the one before it. Fewer than two successes never lock.
    pub async fn should_lock_for_inactivity(&self, username: &str) -> Result<bool, AppError> {
        self.should_lock_for_inactivity_at(username, Utc::now()).await
    }

    /// [`should_lock_for_inactivity`](Self::should_lock_for_inactivity) with an explicit clock.
    pub async fn should_lock_for_inactivity_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let successes = self
            .audit
            .last_n(username, Some(AuditEventType::AuthenticationSuccess), 2)
            .await?;

        let Some(prior) = successes.get(1) else {
            return Ok(false);
        };

        // A cutoff before the start of the calendar can never be crossed.
        let Some(cutoff) = now.checked_sub_signed(self.inactivity_period) else {
            return Ok(false);
        };
        if prior.occurred_at >= cutoff {
            return Ok(false);
        }

        warn!(
            username = %username,
            last_login = %prior.occurred_at,
            "Locking account after inactivity"
        );
        self.sessions.lock_account(username).await?;
        Ok(true)
    }

    /// Locks the account if its most recent attempts all failed.
    pub async fn should_lock_for_failed_attempts(&self, username: &str) -> Result<bool, AppError> {
        let threshold = self.failed_attempt_threshold;
        let recent = self.audit.last_n(username, None, threshold).await?;

        let all_failed = recent.len() >= threshold
            && recent
                .iter()
                .all(|event| event.is(AuditEventType::AuthenticationFailure));
        if !all_failed {
            return Ok(false);
        }

        warn!(
            username = %username,
            attempts = threshold,
            "Locking account after repeated failed logins"
        );
        self.sessions.lock_account(username).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;
    use kripstanx_core::config::SessionConfig;
    use kripstanx_entity::AuditEventType::{AuthenticationFailure, AuthenticationSuccess};

    #[tokio::test]
    async fn test_inactivity_locks_after_period() {
        let fx = Fixture::new();
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        fx.record("u", AuthenticationSuccess, now - Duration::days(31)).await;
        fx.record("u", AuthenticationSuccess, now).await;

        assert!(fx.guard.should_lock_for_inactivity_at("u", now).await.unwrap());
        assert!(!fx.user("u").await.active);
    }

    #[tokio::test]
    async fn test_recent_prior_login_does_not_lock() {
        let fx = Fixture::new();
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        fx.record("u", AuthenticationSuccess, now - Duration::days(10)).await;
        fx.record("u", AuthenticationSuccess, now).await;

        assert!(!fx.guard.should_lock_for_inactivity_at("u", now).await.unwrap());
        assert!(fx.user("u").await.active);
    }

    #[tokio::test]
    async fn test_first_login_never_locks_for_inactivity() {
        let fx = Fixture::new();
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        fx.record("u", AuthenticationSuccess, now).await;
        fx.record("u", AuthenticationFailure, now - Duration::days(400)).await;

        assert!(!fx.guard.should_lock_for_inactivity_at("u", now).await.unwrap());
    }

    #[tokio::test]
    async fn test_inactivity_matches_principal_case_insensitively() {
        let fx = Fixture::new();
        fx.add_user("Mixed", "pw", &[]).await;
        let now = Utc::now();
        fx.record("MIXED", AuthenticationSuccess, now - Duration::days(90)).await;
        fx.record("mixed", AuthenticationSuccess, now).await;

        assert!(fx.guard.should_lock_for_inactivity_at("Mixed", now).await.unwrap());
    }

    #[tokio::test]
    async fn test_three_failures_lock() {
        let fx = Fixture::new();
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        for i in 0..3 {
            fx.record("u", AuthenticationFailure, now - Duration::seconds(3 - i)).await;
        }

        assert!(fx.guard.should_lock_for_failed_attempts("u").await.unwrap());
        assert!(!fx.user("u").await.active);
    }

    #[tokio::test]
    async fn test_intervening_success_prevents_lock() {
        let fx = Fixture::new();
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        fx.record("u", AuthenticationSuccess, now - Duration::seconds(3)).await;
        fx.record("u", AuthenticationFailure, now - Duration::seconds(2)).await;
        fx.record("u", AuthenticationFailure, now - Duration::seconds(1)).await;

        assert!(!fx.guard.should_lock_for_failed_attempts("u").await.unwrap());
        assert!(fx.user("u").await.active);
    }

    #[tokio::test]
    async fn test_fewer_than_threshold_failures_do_not_lock() {
        let fx = Fixture::new();
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        fx.record("u", AuthenticationFailure, now - Duration::seconds(1)).await;
        fx.record("u", AuthenticationFailure, now).await;

        assert!(!fx.guard.should_lock_for_failed_attempts("u").await.unwrap());
    }

    #[test]
    fn test_unrepresentable_inactivity_period_rejected() {
        let fx = Fixture::new();
        let config = SecurityConfig {
            inactivity_period_days: 1_000_000_000,
            ..SecurityConfig::default()
        };
        let err = LoginGuard::new(fx.audit.clone(), fx.sessions.clone(), &config).unwrap_err();
        assert_eq!(err.kind, kripstanx_core::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_inactivity_period_beyond_calendar_never_locks() {
        let security = SecurityConfig {
            inactivity_period_days: 100_000_000,
            ..SecurityConfig::default()
        };
        let fx = Fixture::with_config(SessionConfig::default(), security);
        fx.add_user("u", "pw", &[]).await;
        let now = Utc::now();
        fx.record("u", AuthenticationSuccess, now - Duration::days(3650)).await;
        fx.record("u", AuthenticationSuccess, now).await;

        assert!(!fx.guard.should_lock_for_inactivity_at("u", now).await.unwrap());
        assert!(fx.user("u").await.active);
    }
}
