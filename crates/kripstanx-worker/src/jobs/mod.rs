//! Built-in scheduled jobs.

pub mod session_sweep;

pub use session_sweep::SessionSweepJob;
