//! Token signing configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum HMAC key length in bytes for HS512.
pub const MIN_SECRET_BYTES: usize = 64;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_VALIDITY_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Authentication and token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for session token signing (HMAC-SHA512).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Lifetime of a freshly issued session token, in seconds.
    #[serde(default = "default_token_validity")]
    pub token_validity_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_validity_seconds: default_token_validity(),
        }
    }
}

impl AuthConfig {
    /// Checks the signing key length and token lifetime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.jwt_secret.len() < MIN_SECRET_BYTES {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }
        if self.token_validity_seconds == 0 {
            return Err(AppError::configuration(
                "auth.token_validity_seconds must be positive",
            ));
        }
        if self.token_validity_seconds > MAX_TOKEN_VALIDITY_SECONDS {
            return Err(AppError::configuration(format!(
                "auth.token_validity_seconds must not exceed {MAX_TOKEN_VALIDITY_SECONDS}"
            )));
        }
        Ok(())
    }
}

fn default_jwt_secret() -> String {
    String::new()
}

fn default_token_validity() -> u64 {
    1800
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        let cfg = AuthConfig {
            jwt_secret: "too-short".to_string(),
            token_validity_seconds: 60,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_long_secret_accepted() {
        let cfg = AuthConfig {
            jwt_secret: "k".repeat(MIN_SECRET_BYTES),
            token_validity_seconds: 60,
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validity_upper_bound() {
        let mut cfg = AuthConfig {
            jwt_secret: "k".repeat(MIN_SECRET_BYTES),
            token_validity_seconds: MAX_TOKEN_VALIDITY_SECONDS,
        };
        assert!(cfg.validate().is_ok());

        cfg.token_validity_seconds = MAX_TOKEN_VALIDITY_SECONDS + 1;
        assert!(cfg.validate().is_err());
        cfg.token_validity_seconds = u64::MAX;
        assert!(cfg.validate().is_err());
    }
}
