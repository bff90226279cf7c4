//! Cron scheduler for periodic tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use kripstanx_core::config::SessionConfig;
use kripstanx_core::error::AppError;

use crate::jobs::SessionSweepJob;

/// Cron-based scheduler for periodic background tasks
#[derive(Clone)]
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }

    /// Session sweep on `session.sweep_cron`
    pub async fn register_session_sweep(
        &self,
        job: Arc<SessionSweepJob>,
        config: &SessionConfig,
    ) -> Result<(), AppError> {
        let schedule = config.sweep_cron.as_str();
        let cron_job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                job.run().await;
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create session_sweep schedule: {e}"))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_sweep schedule: {e}"))
        })?;

        tracing::info!(schedule = %schedule, "Registered: session_sweep");
        Ok(())
    }
}
