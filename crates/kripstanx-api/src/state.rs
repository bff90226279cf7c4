//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use kripstanx_auth::{
    Authenticator, LoginGuard, LoginManager, PasswordHasher, SessionService, TokenCodec,
    UserSessionStore,
};
use kripstanx_core::config::AppConfig;
use kripstanx_core::error::AppError;
use kripstanx_database::{AuditEventRepository, UserRepository};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Token rotation, validation and invalidation
    pub sessions: Arc<SessionService>,
    /// Login and logout flow
    pub login: Arc<LoginManager>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sessions", &self.sessions)
            .field("login", &self.login)
            .finish()
    }
}

impl AppState {
    /// Wires the auth services over the given stores.
    ///
    /// Fails when a configured duration cannot be represented.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserRepository>,
        audit: Arc<dyn AuditEventRepository>,
    ) -> Result<Self, AppError> {
        let codec = Arc::new(TokenCodec::new(&config.auth));
        let store = Arc::new(UserSessionStore::new(Arc::clone(&users)));
        let sessions = Arc::new(SessionService::new(
            codec,
            store,
            Arc::clone(&users),
            &config.auth,
            &config.session,
        )?);
        let guard = Arc::new(LoginGuard::new(
            Arc::clone(&audit),
            Arc::clone(&sessions),
            &config.security,
        )?);
        let authenticator = Arc::new(Authenticator::new(
            Arc::clone(&users),
            audit,
            PasswordHasher::new(),
        ));
        let login = Arc::new(LoginManager::new(
            authenticator,
            guard,
            Arc::clone(&sessions),
            users,
        ));

        Ok(Self {
            config: Arc::new(config),
            sessions,
            login,
        })
    }
}
