//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod logging;
pub mod security;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::security::SecurityConfig;
pub use self::session::SessionConfig;

use crate::error::{AppError, ErrorKind};

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User and audit store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session rotation and sweep settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Lockout and restricted-mode settings.
    #[serde(default)]
    pub security: SecurityConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Accounts created at startup when missing.
    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

/// Backend used for the user and audit stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreProvider {
    /// PostgreSQL via sqlx.
    #[default]
    Postgres,
    /// Process-local maps; state is lost on restart.
    Memory,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Which store implementation to use.
    #[serde(default)]
    pub provider: StoreProvider,
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::default(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

/// An account to provision on startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Login name.
    pub username: String,
    /// Clear-text password, hashed before it is stored.
    pub password: String,
    /// Granted authorities, e.g. `ROLE_USER`.
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `KRIPSTANX__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("KRIPSTANX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build config: {e}"),
                    e,
                )
            })?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to deserialize config: {e}"),
                    e,
                )
            })?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Rejects settings the services cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        self.auth.validate()?;
        if self.database.provider == StoreProvider::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres provider",
            ));
        }
        if self.session.grace_window_seconds == 0 {
            return Err(AppError::configuration(
                "session.grace_window_seconds must be positive",
            ));
        }
        if self.session.grace_window_seconds > self.auth.token_validity_seconds {
            return Err(AppError::configuration(
                "session.grace_window_seconds must not exceed auth.token_validity_seconds",
            ));
        }
        if self.security.inactivity_period_days == 0
            || self.security.inactivity_period_days > security::MAX_INACTIVITY_PERIOD_DAYS
        {
            return Err(AppError::configuration(format!(
                "security.inactivity_period_days must be between 1 and {}",
                security::MAX_INACTIVITY_PERIOD_DAYS
            )));
        }
        if self.security.failed_attempt_threshold == 0 {
            return Err(AppError::configuration(
                "security.failed_attempt_threshold must be positive",
            ));
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
