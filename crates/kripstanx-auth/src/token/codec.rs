//! HS512 session token encoding and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use uuid::Uuid;

use kripstanx_core::config::AuthConfig;
use kripstanx_core::error::AppError;

use super::claims::TokenClaims;

/// Issues and verifies signed session tokens.
///
/// Verification never errors: a malformed, tampered or expired token is
/// simply not accepted.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS512)
            .finish()
    }
}

impl TokenCodec {
    /// Creates a codec keyed with `auth.jwt_secret`.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS512);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Mints a token for `subject` that expires `validity` from now.
    pub fn issue(
        &self,
        subject: &str,
        authorities: &[String],
        validity: Duration,
    ) -> Result<String, AppError> {
        self.issue_at(subject, authorities, validity, Utc::now())
    }

    /// Mints a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        authorities: &[String],
        validity: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AppError> {
        let expires_at = now
            .checked_add_signed(validity)
            .ok_or_else(|| AppError::internal("Session token expiry is out of range"))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            auth: TokenClaims::join_authorities(authorities),
            salt: Uuid::new_v4().to_string(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }

    /// Verifies signature and expiry against the current time.
    pub fn verify(&self, token: &str) -> Option<TokenClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verifies signature and expiry as if the current time were `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenClaims> {
        let claims = match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "Rejected session token");
                return None;
            }
        };

        if !claims.is_live_at(now) {
            debug!(subject = %claims.sub, "Rejected expired session token");
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TEST_SECRET;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            token_validity_seconds: 1800,
        })
    }

    #[test]
    fn test_issue_then_verify() {
        let codec = codec();
        let authorities = vec!["ROLE_USER".to_string()];
        let token = codec
            .issue("alice", &authorities, Duration::minutes(30))
            .unwrap();

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.authorities(), authorities);
    }

    #[test]
    fn test_same_inputs_produce_distinct_tokens() {
        let codec = codec();
        let now = Utc::now();
        let a = codec.issue_at("alice", &[], Duration::minutes(1), now).unwrap();
        let b = codec.issue_at("alice", &[], Duration::minutes(1), now).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let now = Utc::now();
        let token = codec.issue_at("alice", &[], Duration::seconds(10), now).unwrap();
        assert!(codec.verify_at(&token, now + Duration::seconds(9)).is_some());
        assert!(codec.verify_at(&token, now + Duration::seconds(10)).is_none());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = codec();
        let token = codec.issue("alice", &[], Duration::minutes(5)).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let payload = parts[1].clone();
        let first = if payload.starts_with('e') { 'f' } else { 'e' };
        parts[1] = format!("{first}{}", &payload[1..]);

        assert!(codec.verify(&parts.join(".")).is_none());
    }

    #[test]
    fn test_foreign_key_rejected() {
        let token = codec().issue("alice", &[], Duration::minutes(5)).unwrap();
        let other = TokenCodec::new(&AuthConfig {
            jwt_secret: "x".repeat(64),
            token_validity_seconds: 1800,
        });
        assert!(other.verify(&token).is_none());
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(codec().verify("not-a-token").is_none());
        assert!(codec().verify("").is_none());
    }

    #[test]
    fn test_expiry_past_calendar_end_is_error() {
        let err = codec()
            .issue_at("alice", &[], Duration::MAX, Utc::now())
            .unwrap_err();
        assert_eq!(err.kind, kripstanx_core::ErrorKind::Internal);
    }
}
