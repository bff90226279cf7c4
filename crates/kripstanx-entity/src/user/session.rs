//! Per-user session slots: the current token and one grace-window predecessor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The session part of a user record.
///
/// `previous_token` is only ever set by [`UserSessionState::rotate`] and is
/// always paired with `previous_token_expires_at`. A previous token whose
/// expiry has passed is treated as absent whether or not the sweep has
/// physically cleared it yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSessionState {
    /// The token minted by the most recent login or renewal.
    pub current_token: Option<String>,
    /// The token `current_token` replaced, valid until `previous_token_expires_at`.
    pub previous_token: Option<String>,
    /// End of the grace window for `previous_token`.
    pub previous_token_expires_at: Option<DateTime<Utc>>,
}

impl UserSessionState {
    /// Returns the state after `new_token` replaces the current token.
    ///
    /// The old current token (if any) is demoted into the single previous
    /// slot until `grace_until`; whatever was in that slot is dropped.
    pub fn rotate(&self, new_token: String, grace_until: DateTime<Utc>) -> Self {
        match &self.current_token {
            Some(current) => Self {
                current_token: Some(new_token),
                previous_token: Some(current.clone()),
                previous_token_expires_at: Some(grace_until),
            },
            None => Self {
                current_token: Some(new_token),
                previous_token: None,
                previous_token_expires_at: None,
            },
        }
    }

    /// The previous token, if its grace window is still open at `now`.
    pub fn live_previous_token(&self, now: DateTime<Utc>) -> Option<&str> {
        match (&self.previous_token, self.previous_token_expires_at) {
            (Some(token), Some(expires_at)) if expires_at > now => Some(token.as_str()),
            _ => None,
        }
    }

    /// Whether `token` is the current token or the live previous token.
    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.current_token.as_deref() == Some(token)
            || self.live_previous_token(now) == Some(token)
    }

    /// Whether the previous slot is occupied but its grace window has closed.
    pub fn has_expired_previous(&self, now: DateTime<Utc>) -> bool {
        matches!(self.previous_token_expires_at, Some(expires_at) if expires_at <= now)
    }

    /// Returns the state with an expired previous slot cleared.
    pub fn without_expired_previous(&self, now: DateTime<Utc>) -> Self {
        if self.has_expired_previous(now) {
            Self {
                current_token: self.current_token.clone(),
                previous_token: None,
                previous_token_expires_at: None,
            }
        } else {
            self.clone()
        }
    }

    /// Whether the user holds no token at all.
    pub fn is_cleared(&self) -> bool {
        self.current_token.is_none() && self.previous_token.is_none()
    }
}
