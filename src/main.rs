//! KripStanx Server: session-token authentication service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use kripstanx_auth::{PasswordHasher, provision_seed_users};
use kripstanx_core::config::{AppConfig, StoreProvider};
use kripstanx_core::error::AppError;
use kripstanx_database::{
    AuditEventRepository, DatabasePool, MemoryAuditEventRepository, MemoryUserRepository,
    PgAuditEventRepository, PgUserRepository, UserRepository,
};
use kripstanx_worker::{CronScheduler, SessionSweepJob};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("KRIPSTANX_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting KripStanx");

    // ── Step 1: User and audit stores ────────────────────────────
    let (users, audit, db_pool): (
        Arc<dyn UserRepository>,
        Arc<dyn AuditEventRepository>,
        Option<DatabasePool>,
    ) = match config.database.provider {
        StoreProvider::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            kripstanx_database::migration::run_migrations(pool.pool()).await?;
            (
                Arc::new(PgUserRepository::new(pool.pool().clone())),
                Arc::new(PgAuditEventRepository::new(pool.pool().clone())),
                Some(pool),
            )
        }
        StoreProvider::Memory => {
            tracing::warn!("Using in-memory stores; all users and sessions are lost on restart");
            (
                Arc::new(MemoryUserRepository::new()),
                Arc::new(MemoryAuditEventRepository::new()),
                None,
            )
        }
    };

    // ── Step 2: Seed users ───────────────────────────────────────
    let created =
        provision_seed_users(users.as_ref(), &PasswordHasher::new(), &config.seed_users).await?;
    if created > 0 {
        tracing::info!(created, "Seed users provisioned");
    }

    // ── Step 3: Auth services ────────────────────────────────────
    let state = kripstanx_api::AppState::new(config.clone(), users, audit)?;

    // ── Step 4: Restricted mode ──────────────────────────────────
    if config.security.restricted_mode {
        tracing::warn!("Restricted mode enabled: only technical users may make changes");
        state.sessions.lock_out_non_technical_users().await?;
    }

    // ── Step 5: Scheduled session sweep ──────────────────────────
    let scheduler = CronScheduler::new().await?;
    let sweep = Arc::new(SessionSweepJob::new(Arc::clone(&state.sessions)));
    scheduler
        .register_session_sweep(sweep, &config.session)
        .await?;
    scheduler.start().await?;

    // ── Step 6: HTTP server ──────────────────────────────────────
    let app = kripstanx_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "KripStanx server listening");

    // ── Step 7: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    match tokio::time::timeout(grace, scheduler.shutdown()).await {
        Ok(Err(e)) => tracing::warn!(error = %e, "Scheduler did not shut down cleanly"),
        Err(_) => tracing::warn!("Timed out waiting for the scheduler to stop"),
        Ok(Ok(())) => {}
    }
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("KripStanx server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
