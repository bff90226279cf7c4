//! Response DTOs.

use serde::{Deserialize, Serialize};

use kripstanx_auth::Principal;

/// Body returned with a freshly issued session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtTokenResponse {
    /// The session token, also sent in the `Authorization` header.
    pub id_token: String,
}

/// Body of the password-expired login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordExpiredResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Key for completing the password reset.
    pub reset_key: String,
}

/// The authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    /// Login name.
    pub username: String,
    /// Granted authorities.
    pub authorities: Vec<String>,
}

impl From<Principal> for AccountResponse {
    fn from(principal: Principal) -> Self {
        Self {
            username: principal.username,
            authorities: principal.authorities,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
}
