//! Login orchestration: credentials, lockout policy, password expiry, token.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use kripstanx_core::error::AppError;
use kripstanx_database::UserRepository;

use crate::guard::LoginGuard;
use crate::password::Authenticator;
use crate::principal::Principal;
use crate::session::SessionService;

/// Successful result of a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A new session token.
    Token(String),
    /// Credentials were accepted but the password must be reset first.
    PasswordExpired {
        /// Key for completing the reset.
        reset_key: String,
    },
}

/// Runs the complete login flow.
#[derive(Clone)]
pub struct LoginManager {
    authenticator: Arc<Authenticator>,
    guard: Arc<LoginGuard>,
    sessions: Arc<SessionService>,
    users: Arc<dyn UserRepository>,
}

impl std::fmt::Debug for LoginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginManager").finish()
    }
}

impl LoginManager {
    /// Creates a new login manager.
    pub fn new(
        authenticator: Arc<Authenticator>,
        guard: Arc<LoginGuard>,
        sessions: Arc<SessionService>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            authenticator,
            guard,
            sessions,
            users,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Verify credentials; on failure apply the failed-attempt rule and
    ///    return the original error
    /// 2. Apply the inactivity rule
    /// 3. Divert to password reset if the password expired
    /// 4. End any existing session and issue a new token
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, AppError> {
        self.login_at(username, password, Utc::now()).await
    }

    /// [`login`](Self::login) with an explicit clock for the policy checks.
    pub async fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginOutcome, AppError> {
        // Step 1: Credentials
        let user = match self.authenticator.authenticate(username, password).await {
            Ok(user) => user,
            Err(e) if e.is_login_failure() => {
                self.guard.should_lock_for_failed_attempts(username).await?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        // Step 2: Inactivity
        if self
            .guard
            .should_lock_for_inactivity_at(&user.username, now)
            .await?
        {
            return Err(AppError::account_disabled(format!(
                "User {} was locked after a long period of inactivity",
                user.username
            )));
        }

        // Step 3: Password expiry
        if user.is_password_expired(now) {
            let reset_key = generate_reset_key();
            self.users
                .set_reset_key(&user.username, &reset_key, now)
                .await?;
            warn!(username = %user.username, "Password expired, reset required");
            return Ok(LoginOutcome::PasswordExpired { reset_key });
        }

        // Step 4: Single session, then issue
        let principal = Principal::from(&user);
        self.sessions.invalidate(&principal.username).await?;
        let token = self.sessions.issue_and_store(&principal).await?;

        info!(username = %principal.username, "User logged in");
        Ok(LoginOutcome::Token(token))
    }

    /// Ends the caller's session. Anonymous callers are a no-op.
    pub async fn logout(&self, principal: Option<&Principal>) -> Result<(), AppError> {
        if let Some(principal) = principal {
            self.sessions.invalidate(&principal.username).await?;
            info!(username = %principal.username, "User logged out");
        }
        Ok(())
    }
}

/// Random 20-digit reset key.
fn generate_reset_key() -> String {
    let digits = Uuid::new_v4().as_u128() % 10u128.pow(20);
    format!("{digits:020}")
}
