//! Auth handlers: authenticate, renew-token, logout.

use axum::Json;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, LOCATION};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use validator::Validate;

use kripstanx_auth::LoginOutcome;
use kripstanx_core::error::AppError;

use crate::dto::request::LoginRequest;
use crate::dto::response::{JwtTokenResponse, PasswordExpiredResponse};
use crate::error::ApiResult;
use crate::extractors::{MaybeAuthUser, bearer_token};
use crate::state::AppState;

/// Header carrying the password-reset key on a password-expired login.
pub const RESET_KEY_HEADER: &str = "x-reset-key";

/// POST /api/authenticate
pub async fn authenticate(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Response> {
    req.validate()
        .map_err(|e| AppError::validation(format!("Invalid login request: {e}")))?;

    match state.login.login(&req.username, &req.password).await? {
        LoginOutcome::Token(token) => token_response(token),
        LoginOutcome::PasswordExpired { reset_key } => {
            let mut headers = HeaderMap::new();
            headers.insert(
                LOCATION,
                header_value(&state.config.security.password_reset_path)?,
            );
            headers.insert(
                HeaderName::from_static(RESET_KEY_HEADER),
                header_value(&reset_key)?,
            );
            let body = PasswordExpiredResponse {
                error: "PASSWORD_EXPIRED".to_string(),
                message: "Password has expired and must be reset".to_string(),
                reset_key,
            };
            Ok((StatusCode::CONFLICT, headers, Json(body)).into_response())
        }
    }
}

/// POST /api/renew-token
///
/// Accepts any live token signed by this server, including one that has
/// since been rotated out, and returns a fresh one.
pub async fn renew_token(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::token_invalid("Missing bearer token"))?;

    match state.sessions.renew(token).await? {
        Some(token) => token_response(token),
        None => Err(AppError::token_invalid("Token is invalid or expired").into()),
    }
}

/// POST /api/logout
pub async fn logout(
    State(state): State<AppState>,
    MaybeAuthUser(principal): MaybeAuthUser,
) -> ApiResult<StatusCode> {
    state.login.logout(principal.as_ref()).await?;
    Ok(StatusCode::OK)
}

fn token_response(token: String) -> ApiResult<Response> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
    Ok((headers, Json(JwtTokenResponse { id_token: token })).into_response())
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::internal(format!("Invalid header value: {e}")))
}
