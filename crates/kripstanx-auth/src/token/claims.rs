//! Session token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::principal::Principal;

/// Separator used for the `auth` claim.
const AUTHORITY_SEPARATOR: char = ',';

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, the username.
    pub sub: String,
    /// Authorities, comma-joined.
    pub auth: String,
    /// Random per-token value so two tokens minted in the same second differ.
    pub salt: String,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl TokenClaims {
    /// Joins authorities into the `auth` claim form.
    pub fn join_authorities(authorities: &[String]) -> String {
        authorities.join(&AUTHORITY_SEPARATOR.to_string())
    }

    /// The authorities in the order they were granted.
    pub fn authorities(&self) -> Vec<String> {
        self.auth
            .split(AUTHORITY_SEPARATOR)
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The principal the token was issued to.
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub.clone(), self.authorities())
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token is still live at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.exp > now.timestamp()
    }
}
