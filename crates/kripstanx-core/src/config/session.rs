//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session rotation and cleanup configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Accept any signature-valid token without checking stored session state.
    #[serde(default)]
    pub allow_multiple_sessions: bool,
    /// How long a just-rotated token stays valid, in seconds.
    #[serde(default = "default_grace_window")]
    pub grace_window_seconds: u64,
    /// Cron expression (with seconds) for the expired previous-token sweep.
    #[serde(default = "default_sweep_cron")]
    pub sweep_cron: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_multiple_sessions: false,
            grace_window_seconds: default_grace_window(),
            sweep_cron: default_sweep_cron(),
        }
    }
}

fn default_grace_window() -> u64 {
    60
}

fn default_sweep_cron() -> String {
    "0 * * * * *".to_string()
}
