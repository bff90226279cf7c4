//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, max = 100, message = "Password is required"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_rejected() {
        let req = LoginRequest {
            username: String::new(),
            password: "pw".into(),
        };
        assert!(req.validate().is_err());

        let req = LoginRequest {
            username: "alice".into(),
            password: "pw".into(),
        };
        assert!(req.validate().is_ok());
    }
}
