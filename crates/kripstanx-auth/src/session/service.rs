//! Token rotation, validation and invalidation.
//!
//! Each user holds at most one current token plus one predecessor that stays
//! valid for a short grace window after it was replaced. This lets requests
//! already in flight with the old token finish after a renewal while still
//! enforcing a single active session per user.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use kripstanx_core::config::{AuthConfig, SessionConfig};
use kripstanx_core::error::AppError;
use kripstanx_database::UserRepository;

use crate::principal::Principal;
use crate::token::{TokenClaims, TokenCodec};

use super::store::UserSessionStore;

/// Issues, validates and revokes session tokens.
#[derive(Clone)]
pub struct SessionService {
    codec: Arc<TokenCodec>,
    store: Arc<UserSessionStore>,
    users: Arc<dyn UserRepository>,
    /// Lifetime of a minted token.
    token_validity: Duration,
    /// How long a replaced token keeps working.
    grace_window: Duration,
    /// Accept any live signed token without consulting stored state.
    allow_multiple_sessions: bool,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("token_validity", &self.token_validity)
            .field("grace_window", &self.grace_window)
            .field("allow_multiple_sessions", &self.allow_multiple_sessions)
            .finish()
    }
}

impl SessionService {
    /// Creates a new session service.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<UserSessionStore>,
        users: Arc<dyn UserRepository>,
        auth_config: &AuthConfig,
        session_config: &SessionConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            codec,
            store,
            users,
            token_validity: seconds(
                "auth.token_validity_seconds",
                auth_config.token_validity_seconds,
            )?,
            grace_window: seconds(
                "session.grace_window_seconds",
                session_config.grace_window_seconds,
            )?,
            allow_multiple_sessions: session_config.allow_multiple_sessions,
        })
    }

    /// Mints a token for `principal` and makes it the user's current token.
    pub async fn issue_and_store(&self, principal: &Principal) -> Result<String, AppError> {
        self.issue_and_store_at(principal, Utc::now()).await
    }

    /// [`issue_and_store`](Self::issue_and_store) with an explicit clock.
    ///
    /// The replaced current token, if any, stays valid until
    /// `now + grace_window`. Whatever sat in the previous slot is dropped.
    pub async fn issue_and_store_at(
        &self,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let username = principal.username.as_str();
        let token =
            self.codec
                .issue_at(username, &principal.authorities, self.token_validity, now)?;

        let state = self
            .store
            .read(username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{username}' not found")))?;
        let grace_until = now
            .checked_add_signed(self.grace_window)
            .ok_or_else(|| AppError::internal("Grace window end is out of range"))?;
        let rotated = state.rotate(token.clone(), grace_until);

        if !self.store.write(username, &rotated).await? {
            return Err(AppError::not_found(format!("User '{username}' not found")));
        }

        info!(
            username = %username,
            grace_until = ?rotated.previous_token_expires_at,
            "Issued session token"
        );
        Ok(token)
    }

    /// The token's claims if it is signed, live and held by its subject.
    pub async fn is_valid(&self, token: &str) -> Result<Option<TokenClaims>, AppError> {
        self.is_valid_at(token, Utc::now()).await
    }

    /// [`is_valid`](Self::is_valid) with an explicit clock.
    ///
    /// Store failures propagate; every other rejection is `Ok(None)`.
    pub async fn is_valid_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<TokenClaims>, AppError> {
        let Some(claims) = self.codec.verify_at(token, now) else {
            return Ok(None);
        };

        if self.allow_multiple_sessions {
            return Ok(Some(claims));
        }

        match self.store.read(&claims.sub).await? {
            Some(state) if state.accepts(token, now) => Ok(Some(claims)),
            Some(_) => {
                debug!(username = %claims.sub, "Session token is no longer held by its user");
                Ok(None)
            }
            None => {
                debug!(username = %claims.sub, "Session token subject has no user record");
                Ok(None)
            }
        }
    }

    /// Clears every token slot of `username`.
    pub async fn invalidate(&self, username: &str) -> Result<(), AppError> {
        if self.store.clear(username).await? {
            info!(username = %username, "Session invalidated");
        } else {
            debug!(username = %username, "No user record to invalidate");
        }
        Ok(())
    }

    /// Exchanges a signed, live token for a freshly rotated one.
    ///
    /// Unlike [`is_valid`](Self::is_valid) the old token need not be the
    /// stored current token, so a client can renew after a rotation made
    /// elsewhere. Returns `None` when the token fails verification or its
    /// subject no longer exists or is locked.
    pub async fn renew(&self, token: &str) -> Result<Option<String>, AppError> {
        self.renew_at(token, Utc::now()).await
    }

    /// [`renew`](Self::renew) with an explicit clock.
    pub async fn renew_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppError> {
        let Some(claims) = self.codec.verify_at(token, now) else {
            return Ok(None);
        };

        match self.users.find_by_username(&claims.sub).await? {
            Some(user) if user.active => {}
            Some(_) => {
                warn!(username = %claims.sub, "Refused to renew token of a locked account");
                return Ok(None);
            }
            None => {
                debug!(username = %claims.sub, "Refused to renew token of an unknown user");
                return Ok(None);
            }
        }

        let token = self.issue_and_store_at(&claims.principal(), now).await?;
        info!(username = %claims.sub, "Renewed session token");
        Ok(Some(token))
    }

    /// Clears previous tokens whose grace window has closed.
    pub async fn sweep_expired_previous_tokens(&self) -> Result<u64, AppError> {
        self.sweep_expired_previous_tokens_at(Utc::now()).await
    }

    /// [`sweep_expired_previous_tokens`](Self::sweep_expired_previous_tokens)
    /// with an explicit clock.
    pub async fn sweep_expired_previous_tokens_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let cleared = self.store.sweep_expired_previous_tokens(now).await?;
        if cleared > 0 {
            debug!(cleared, "Swept expired previous session tokens");
        }
        Ok(cleared)
    }

    /// Deactivates an account. Existing tokens are left in place.
    pub async fn lock_account(&self, username: &str) -> Result<(), AppError> {
        if self.users.set_active(username, false).await? {
            warn!(username = %username, "Account locked");
        }
        Ok(())
    }

    /// Invalidates the session of every user without the technical authority.
    ///
    /// Returns how many sessions were ended.
    pub async fn lock_out_non_technical_users(&self) -> Result<u32, AppError> {
        let mut ended = 0u32;
        for user in self.users.find_with_active_session().await? {
            if user.is_technical() {
                continue;
            }
            self.invalidate(&user.username).await?;
            ended += 1;
        }
        info!(ended, "Ended sessions of non-technical users");
        Ok(ended)
    }
}

/// Converts a configured number of seconds into a duration.
fn seconds(name: &str, value: u64) -> Result<Duration, AppError> {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| AppError::configuration(format!("{name} is out of range: {value}")))
}
