//! Shared fixtures for unit tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use kripstanx_core::config::{AuthConfig, SecurityConfig, SessionConfig};
use kripstanx_database::{
    AuditEventRepository, MemoryAuditEventRepository, MemoryUserRepository, UserRepository,
};
use kripstanx_entity::{AuditEventType, UserRecord};

use crate::guard::LoginGuard;
use crate::password::{Authenticator, PasswordHasher};
use crate::session::{SessionService, UserSessionStore};
use crate::token::TokenCodec;

pub const TEST_SECRET: &str =
    "kripstanx-unit-test-secret-kripstanx-unit-test-secret-kripstanx-unit-test";

pub struct Fixture {
    pub users: Arc<MemoryUserRepository>,
    pub audit: Arc<MemoryAuditEventRepository>,
    pub codec: Arc<TokenCodec>,
    pub sessions: Arc<SessionService>,
    pub guard: Arc<LoginGuard>,
    pub authenticator: Arc<Authenticator>,
    pub hasher: PasswordHasher,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default(), SecurityConfig::default())
    }

    pub fn with_config(session: SessionConfig, security: SecurityConfig) -> Self {
        let auth = AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            token_validity_seconds: 1800,
        };
        let users = Arc::new(MemoryUserRepository::new());
        let audit = Arc::new(MemoryAuditEventRepository::new());
        let user_repo: Arc<dyn UserRepository> = users.clone();
        let audit_repo: Arc<dyn AuditEventRepository> = audit.clone();

        let codec = Arc::new(TokenCodec::new(&auth));
        let store = Arc::new(UserSessionStore::new(user_repo.clone()));
        let sessions = Arc::new(SessionService::new(
            codec.clone(),
            store,
            user_repo.clone(),
            &auth,
            &session,
        )
        .unwrap());
        let guard = Arc::new(
            LoginGuard::new(audit_repo.clone(), sessions.clone(), &security).unwrap(),
        );
        let hasher = PasswordHasher::new();
        let authenticator = Arc::new(Authenticator::new(user_repo, audit_repo, hasher.clone()));

        Self {
            users,
            audit,
            codec,
            sessions,
            guard,
            authenticator,
            hasher,
        }
    }

    pub async fn add_user(&self, username: &str, password: &str, authorities: &[&str]) -> UserRecord {
        let hash = self.hasher.hash_password(password).unwrap();
        let user = UserRecord::new(
            username,
            hash,
            authorities.iter().map(|a| a.to_string()).collect(),
        );
        self.users.save(&user).await.unwrap();
        user
    }

    pub async fn record(&self, username: &str, event_type: AuditEventType, at: DateTime<Utc>) {
        self.audit.append(username, event_type, at).await.unwrap();
    }

    pub async fn user(&self, username: &str) -> UserRecord {
        self.users.find_by_username(username).await.unwrap().unwrap()
    }
}
