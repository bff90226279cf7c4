//! Account lockout and restricted-mode configuration.

use serde::{Deserialize, Serialize};

/// Longest accepted inactivity period: one hundred years.
pub const MAX_INACTIVITY_PERIOD_DAYS: u64 = 36_500;

/// Login policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Days without a successful login after which the next login locks the account.
    #[serde(default = "default_inactivity_period")]
    pub inactivity_period_days: u64,
    /// Number of consecutive failed logins that lock the account.
    #[serde(default = "default_failed_attempts")]
    pub failed_attempt_threshold: usize,
    /// Only technical users may send non-read requests.
    #[serde(default)]
    pub restricted_mode: bool,
    /// Client route that finishes a password reset.
    #[serde(default = "default_reset_path")]
    pub password_reset_path: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            inactivity_period_days: default_inactivity_period(),
            failed_attempt_threshold: default_failed_attempts(),
            restricted_mode: false,
            password_reset_path: default_reset_path(),
        }
    }
}

fn default_inactivity_period() -> u64 {
    30
}

fn default_failed_attempts() -> usize {
    3
}

fn default_reset_path() -> String {
    "/reset/finish".to_string()
}
