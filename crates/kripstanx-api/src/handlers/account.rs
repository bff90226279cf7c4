//! Account handlers for the authenticated caller.

use axum::Json;

use crate::dto::response::AccountResponse;
use crate::extractors::AuthUser;

/// GET /api/account
pub async fn get_account(AuthUser(principal): AuthUser) -> Json<AccountResponse> {
    Json(principal.into())
}

/// GET /api/keep-alive-session
///
/// Lets a client confirm its session is still accepted.
pub async fn keep_alive(_auth: AuthUser) -> Json<bool> {
    Json(true)
}
