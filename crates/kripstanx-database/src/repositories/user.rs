//! PostgreSQL user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use kripstanx_core::error::{AppError, ErrorKind};
use kripstanx_core::result::AppResult;
use kripstanx_entity::{UserRecord, UserSessionState};

use super::UserRepository;

/// User store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn save(&self, user: &UserRecord) -> AppResult<()> {
        sqlx::query(
            r#"INSERT INTO users
                (id, username, password_hash, active, authorities, password_expiration_date,
                 reset_key, reset_date, current_token, previous_token,
                 previous_token_expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                username = EXCLUDED.username,
                password_hash = EXCLUDED.password_hash,
                active = EXCLUDED.active,
                authorities = EXCLUDED.authorities,
                password_expiration_date = EXCLUDED.password_expiration_date,
                reset_key = EXCLUDED.reset_key,
                reset_date = EXCLUDED.reset_date,
                current_token = EXCLUDED.current_token,
                previous_token = EXCLUDED.previous_token,
                previous_token_expires_at = EXCLUDED.previous_token_expires_at"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(&user.authorities)
        .bind(user.password_expiration_date)
        .bind(&user.reset_key)
        .bind(user.reset_date)
        .bind(&user.session.current_token)
        .bind(&user.session.previous_token)
        .bind(user.session.previous_token_expires_at)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save user", e))?;
        Ok(())
    }

    async fn update_session_state(
        &self,
        username: &str,
        state: &UserSessionState,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"UPDATE users
            SET current_token = $2, previous_token = $3, previous_token_expires_at = $4
            WHERE LOWER(username) = LOWER($1)"#,
        )
        .bind(username)
        .bind(&state.current_token)
        .bind(&state.previous_token)
        .bind(state.previous_token_expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to write session state", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear_expired_previous_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"UPDATE users
            SET previous_token = NULL, previous_token_expires_at = NULL
            WHERE previous_token_expires_at IS NOT NULL AND previous_token_expires_at <= $1"#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to clear expired previous tokens",
                e,
            )
        })?;
        Ok(result.rows_affected())
    }

    async fn set_active(&self, username: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET active = $2 WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update user active flag", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_with_active_session(&self) -> AppResult<Vec<UserRecord>> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT * FROM users WHERE current_token IS NOT NULL ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                "Failed to list users with an active session",
                e,
            )
        })
    }

    async fn set_reset_key(
        &self,
        username: &str,
        reset_key: &str,
        reset_date: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET reset_key = $2, reset_date = $3 WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .bind(reset_key)
        .bind(reset_date)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store reset key", e))?;
        Ok(result.rows_affected() > 0)
    }
}
