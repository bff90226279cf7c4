//! Periodic removal of previous tokens whose grace window has closed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kripstanx_auth::SessionService;

/// Sweeps expired previous tokens once per tick.
///
/// A tick that fires while the previous run is still going is skipped
/// rather than queued. Errors are logged and the next tick runs as usual.
#[derive(Debug)]
pub struct SessionSweepJob {
    /// Session service performing the sweep
    sessions: Arc<SessionService>,
    /// Set while a run is in progress
    running: AtomicBool,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepRun {
    /// The sweep ran and cleared this many users' previous tokens
    Completed(u64),
    /// Another run was still in progress
    Skipped,
    /// The store reported an error
    Failed,
}

impl SessionSweepJob {
    /// Create a new sweep job
    pub fn new(sessions: Arc<SessionService>) -> Self {
        Self {
            sessions,
            running: AtomicBool::new(false),
        }
    }

    /// Run one sweep unless one is already in flight
    pub async fn run(&self) -> SweepRun {
        let Some(_running) = RunningFlag::acquire(&self.running) else {
            tracing::warn!("Previous session sweep still running, skipping this tick");
            return SweepRun::Skipped;
        };

        match self.sessions.sweep_expired_previous_tokens().await {
            Ok(cleared) => {
                tracing::debug!(cleared, "Session sweep finished");
                SweepRun::Completed(cleared)
            }
            Err(e) => {
                tracing::error!(error = %e, "Session sweep failed");
                SweepRun::Failed
            }
        }
    }
}

/// Holds the in-progress flag; released on drop, including when the run
/// future is cancelled or unwinds.
struct RunningFlag<'a>(&'a AtomicBool);

impl<'a> RunningFlag<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, Utc};
    use kripstanx_auth::{Principal, SessionService, TokenCodec, UserSessionStore};
    use kripstanx_core::config::{AuthConfig, SessionConfig};
    use kripstanx_database::{MemoryUserRepository, UserRepository};
    use kripstanx_entity::UserRecord;

    async fn sessions_with_expired_previous() -> (Arc<SessionService>, Arc<MemoryUserRepository>) {
        let auth = AuthConfig {
            jwt_secret: "sweep-test-secret-".repeat(4),
            token_validity_seconds: 1800,
        };
        let users = Arc::new(MemoryUserRepository::new());
        users
            .save(&UserRecord::new("alice", "hash", vec![]))
            .await
            .unwrap();
        let sessions = Arc::new(SessionService::new(
            Arc::new(TokenCodec::new(&auth)),
            Arc::new(UserSessionStore::new(users.clone())),
            users.clone(),
            &auth,
            &SessionConfig::default(),
        )
        .unwrap());

        let past = Utc::now() - Duration::minutes(5);
        let alice = Principal::new("alice", vec![]);
        sessions.issue_and_store_at(&alice, past).await.unwrap();
        sessions.issue_and_store_at(&alice, past).await.unwrap();
        (sessions, users)
    }

    #[tokio::test]
    async fn test_run_clears_then_is_noop() {
        let (sessions, users) = sessions_with_expired_previous().await;
        let job = SessionSweepJob::new(sessions);

        assert_eq!(job.run().await, SweepRun::Completed(1));
        assert_eq!(job.run().await, SweepRun::Completed(0));

        let alice = users.find_by_username("alice").await.unwrap().unwrap();
        assert!(alice.session.current_token.is_some());
        assert!(alice.session.previous_token.is_none());
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_skipped() {
        let (sessions, _users) = sessions_with_expired_previous().await;
        let job = SessionSweepJob::new(sessions);

        job.running.store(true, Ordering::Release);
        assert_eq!(job.run().await, SweepRun::Skipped);

        job.running.store(false, Ordering::Release);
        assert_eq!(job.run().await, SweepRun::Completed(1));
    }

    #[test]
    fn test_running_flag_released_on_drop() {
        let flag = AtomicBool::new(false);
        let held = RunningFlag::acquire(&flag).unwrap();
        assert!(RunningFlag::acquire(&flag).is_none());
        drop(held);
        assert!(!flag.load(Ordering::Acquire));
        assert!(RunningFlag::acquire(&flag).is_some());
    }

    #[test]
    fn test_running_flag_released_on_unwind() {
        let flag = AtomicBool::new(false);
        let outcome = std::panic::catch_unwind(|| {
            let _held = RunningFlag::acquire(&flag).unwrap();
            panic!("sweep blew up");
        });
        assert!(outcome.is_err());
        assert!(!flag.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_cancelled_run_does_not_block_later_ticks() {
        let (sessions, _users) = sessions_with_expired_previous().await;
        let job = SessionSweepJob::new(sessions);

        // Poll once, then drop the run before it can finish.
        {
            let run = std::pin::pin!(job.run());
            let waker = std::task::Waker::noop();
            let mut cx = std::task::Context::from_waker(waker);
            let _ = run.poll(&mut cx);
        }

        assert!(!job.running.load(Ordering::Acquire));
        assert_ne!(job.run().await, SweepRun::Skipped);
    }
}
