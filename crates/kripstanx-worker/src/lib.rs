//! Scheduled background tasks for KripStanx.
//!
//! This crate provides:
//! - A cron scheduler that owns the periodic tasks
//! - The session sweep job that clears expired previous tokens

pub mod jobs;
pub mod scheduler;

pub use jobs::SessionSweepJob;
pub use scheduler::CronScheduler;
