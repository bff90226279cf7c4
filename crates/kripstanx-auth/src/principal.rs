//! The authenticated caller.

use serde::{Deserialize, Serialize};

use kripstanx_entity::UserRecord;
use kripstanx_entity::user::authority;

/// Username and granted authorities of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Login name.
    pub username: String,
    /// Granted authorities in grant order.
    pub authorities: Vec<String>,
}

impl Principal {
    /// Creates a principal.
    pub fn new(username: impl Into<String>, authorities: Vec<String>) -> Self {
        Self {
            username: username.into(),
            authorities,
        }
    }

    /// Whether the principal holds the given authority.
    pub fn has_authority(&self, name: &str) -> bool {
        self.authorities.iter().any(|a| a == name)
    }

    /// Whether the principal may write while the system is restricted.
    pub fn is_technical(&self) -> bool {
        self.has_authority(authority::TECHNICAL)
    }
}

impl From<&UserRecord> for Principal {
    fn from(user: &UserRecord) -> Self {
        Self::new(user.username.clone(), user.authorities.clone())
    }
}
