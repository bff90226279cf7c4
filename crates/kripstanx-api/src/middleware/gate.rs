//! Request authentication gate.
//!
//! Per request: resolve the bearer token, validate it against the caller's
//! session, then either install the principal, reject a restricted-mode
//! write, or pass the request on anonymously. An invalid token never
//! rejects by itself; endpoints that need a caller do that through
//! [`AuthUser`](crate::extractors::AuthUser).

use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{debug, warn};

use kripstanx_auth::Principal;
use kripstanx_core::error::AppError;

use crate::error::ApiResult;
use crate::extractors::bearer_token;
use crate::state::AppState;

/// Path suffix of the token renewal endpoint, exempt from the write restriction.
const RENEW_TOKEN_SUFFIX: &str = "/renew-token";

/// Message returned when a write is refused in restricted mode.
pub const OFFLINE_MODE_MESSAGE: &str =
    "The application is in offline mode: only technical users may make changes";

/// Validates the bearer token and installs the caller's principal.
pub async fn authentication_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = bearer_token(request.headers()).map(str::to_string);

    if let Some(token) = token {
        match state.sessions.is_valid(&token).await? {
            Some(claims) => {
                let principal = claims.principal();
                if state.config.security.restricted_mode
                    && is_restricted_write(request.method(), request.uri().path(), &principal)
                {
                    warn!(
                        username = %principal.username,
                        method = %request.method(),
                        path = %request.uri().path(),
                        "Refused write in offline mode"
                    );
                    return Err(AppError::write_restricted(OFFLINE_MODE_MESSAGE).into());
                }
                request.extensions_mut().insert(principal);
            }
            None => debug!(path = %request.uri().path(), "Ignoring invalid bearer token"),
        }
    }

    Ok(next.run(request).await)
}

/// Whether a method only reads.
fn is_safe_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Whether restricted mode forbids this request for this principal.
fn is_restricted_write(method: &Method, path: &str, principal: &Principal) -> bool {
    !is_safe_read(method) && !path.ends_with(RENEW_TOKEN_SUFFIX) && !principal.is_technical()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kripstanx_entity::user::authority;

    #[test]
    fn test_restricted_write_rules() {
        let user = Principal::new("u", vec![authority::USER.to_string()]);
        let ops = Principal::new("ops", vec![authority::TECHNICAL.to_string()]);

        assert!(is_restricted_write(&Method::POST, "/api/logout", &user));
        assert!(is_restricted_write(&Method::DELETE, "/api/things/1", &user));
        assert!(!is_restricted_write(&Method::GET, "/api/account", &user));
        assert!(!is_restricted_write(&Method::HEAD, "/api/account", &user));
        assert!(!is_restricted_write(&Method::POST, "/api/renew-token", &user));
        assert!(!is_restricted_write(&Method::POST, "/api/logout", &ops));
    }
}
