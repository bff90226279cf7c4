//! In-memory user repository keyed by lower-cased username.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use kripstanx_core::result::AppResult;
use kripstanx_entity::{UserRecord, UserSessionState};

use crate::repositories::UserRepository;

/// User store held in a concurrent map.
///
/// Each mutation takes the shard lock for one entry, which gives the same
/// per-user atomic replace the SQL implementation gets from a single UPDATE.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<String, UserRecord>>,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let key = UserRecord::normalize_username(username);
        Ok(self.users.get(&key).map(|entry| entry.value().clone()))
    }

    async fn save(&self, user: &UserRecord) -> AppResult<()> {
        // A rename leaves the old key behind; drop it so lookups stay unique.
        self.users
            .retain(|_, existing| existing.id != user.id || existing.username == user.username);
        let key = UserRecord::normalize_username(&user.username);
        self.users.insert(key, user.clone());
        Ok(())
    }

    async fn update_session_state(
        &self,
        username: &str,
        state: &UserSessionState,
    ) -> AppResult<bool> {
        let key = UserRecord::normalize_username(username);
        match self.users.get_mut(&key) {
            Some(mut entry) => {
                entry.session = state.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_expired_previous_tokens(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut cleared = 0;
        for mut entry in self.users.iter_mut() {
            if entry.session.has_expired_previous(now) {
                entry.session = entry.session.without_expired_previous(now);
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    async fn set_active(&self, username: &str, active: bool) -> AppResult<bool> {
        let key = UserRecord::normalize_username(username);
        match self.users.get_mut(&key) {
            Some(mut entry) => {
                entry.active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_with_active_session(&self) -> AppResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self
            .users
            .iter()
            .filter(|entry| entry.session.current_token.is_some())
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn set_reset_key(
        &self,
        username: &str,
        reset_key: &str,
        reset_date: DateTime<Utc>,
    ) -> AppResult<bool> {
        let key = UserRecord::normalize_username(username);
        match self.users.get_mut(&key) {
            Some(mut entry) => {
                entry.reset_key = Some(reset_key.to_string());
                entry.reset_date = Some(reset_date);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(name: &str) -> UserRecord {
        UserRecord::new(name, "hash", vec!["ROLE_USER".to_string()])
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let repo = MemoryUserRepository::new();
        repo.save(&user("Alice")).await.unwrap();

        let found = repo.find_by_username("aLiCe").await.unwrap().unwrap();
        assert_eq!(found.username, "Alice");
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_session_state_unknown_user() {
        let repo = MemoryUserRepository::new();
        let updated = repo
            .update_session_state("ghost", &UserSessionState::default())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_clear_expired_previous_tokens() {
        let repo = MemoryUserRepository::new();
        let now = Utc::now();
        repo.save(&user("expired")).await.unwrap();
        repo.save(&user("live")).await.unwrap();

        let expired = UserSessionState {
            current_token: Some("c1".into()),
            previous_token: Some("p1".into()),
            previous_token_expires_at: Some(now - Duration::seconds(1)),
        };
        let live = UserSessionState {
            current_token: Some("c2".into()),
            previous_token: Some("p2".into()),
            previous_token_expires_at: Some(now + Duration::seconds(30)),
        };
        repo.update_session_state("expired", &expired).await.unwrap();
        repo.update_session_state("live", &live).await.unwrap();

        assert_eq!(repo.clear_expired_previous_tokens(now).await.unwrap(), 1);
        assert_eq!(repo.clear_expired_previous_tokens(now).await.unwrap(), 0);

        let swept = repo.find_by_username("expired").await.unwrap().unwrap();
        assert_eq!(swept.session.current_token.as_deref(), Some("c1"));
        assert!(swept.session.previous_token.is_none());
        assert!(swept.session.previous_token_expires_at.is_none());

        let untouched = repo.find_by_username("live").await.unwrap().unwrap();
        assert_eq!(untouched.session, live);
    }

    #[tokio::test]
    async fn test_find_with_active_session() {
        let repo = MemoryUserRepository::new();
        repo.save(&user("idle")).await.unwrap();
        repo.save(&user("busy")).await.unwrap();
        let state = UserSessionState {
            current_token: Some("t".into()),
            ..Default::default()
        };
        repo.update_session_state("busy", &state).await.unwrap();

        let active = repo.find_with_active_session().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].username, "busy");
    }

    #[tokio::test]
    async fn test_set_active_and_reset_key() {
        let repo = MemoryUserRepository::new();
        repo.save(&user("carol")).await.unwrap();
        let now = Utc::now();

        assert!(repo.set_active("CAROL", false).await.unwrap());
        assert!(repo.set_reset_key("carol", "key-1", now).await.unwrap());

        let carol = repo.find_by_username("carol").await.unwrap().unwrap();
        assert!(!carol.active);
        assert_eq!(carol.reset_key.as_deref(), Some("key-1"));
        assert_eq!(carol.reset_date, Some(now));
    }
}
