//! Schema migrations, embedded from the workspace `migrations/` directory.

use sqlx::PgPool;
use tracing::info;

use kripstanx_core::error::{AppError, ErrorKind};

/// Apply all pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    info!("Running database migrations");

    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed");
    Ok(())
}
