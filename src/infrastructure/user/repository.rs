//! In-memory user repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
#[derive(Debug)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Index for email -> user ID lookup
    email_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            email_index: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a repository with initial users
    #[cfg(test)]
    pub fn with_users(users: Vec<User>) -> Self {
        let mut users_map = HashMap::new();
        let mut email_map = HashMap::new();

        for user in users {
            let id = user.id().as_str().to_string();
            email_map.insert(user.email().to_string(), id.clone());
            users_map.insert(id, user);
        }

        Self {
            users: Arc::new(RwLock::new(users_map)),
            email_index: Arc::new(RwLock::new(email_map)),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email_index = self.email_index.read().await;

        if let Some(user_id) = email_index.get(email) {
            let users = self.users.read().await;
            return Ok(users.get(user_id).cloned());
        }

        Ok(None)
    }

    async fn get_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .find(|u| {
                u.password_reset()
                    .is_some_and(|r| r.token_hash == token_hash && r.is_valid_at(now))
            })
            .cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str().to_string();
        let email = user.email().to_string();

        if users.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "User with ID '{}' already exists",
                id
            )));
        }

        if email_index.contains_key(&email) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        email_index.insert(email, id.clone());
        users.insert(id, user.clone());

        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let mut email_index = self.email_index.write().await;

        let id = user.id().as_str().to_string();

        let old_email = match users.get(&id) {
            Some(existing) => existing.email().to_string(),
            None => return Err(DomainError::not_found(format!("User '{}' not found", id))),
        };
        let new_email = user.email().to_string();

        if old_email != new_email {
            if email_index.contains_key(&new_email) {
                return Err(DomainError::conflict(format!(
                    "Email '{}' is already registered",
                    new_email
                )));
            }

            email_index.remove(&old_email);
            email_index.insert(new_email, id.clone());
        }

        users.insert(id, user.clone());

        Ok(user.clone())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.users.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::media::Asset;
    use crate::domain::user::{PasswordReset, ProfileUpdate, Registration};
    use chrono::Duration;

    fn create_test_user(id: &str, email: &str) -> User {
        let registration = Registration {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            phone: "555".to_string(),
            about_me: "About".to_string(),
            password: "password123".to_string(),
            ..Default::default()
        };

        User::new(
            UserId::new(id).unwrap(),
            &registration,
            "hashed_password",
            Asset::new("AVATARS/1", "https://cdn.test/1"),
            Asset::new("RESUME/1", "https://cdn.test/2"),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryUserRepository::new();
        let user = create_test_user("user-1", "a@x.com");

        repo.create(user.clone()).await.unwrap();

        let retrieved = repo.get(user.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.email(), "a@x.com");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_email_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "a@x.com")).await.unwrap();

        assert!(repo.email_exists("a@x.com").await.unwrap());
        assert!(!repo.email_exists("A@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_email_uniqueness_on_create() {
        let repo = InMemoryUserRepository::new();
        repo.create(create_test_user("user-1", "a@x.com")).await.unwrap();

        let result = repo.create(create_test_user("user-2", "a@x.com")).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_changes_email_index() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("user-1", "a@x.com");
        repo.create(user.clone()).await.unwrap();

        user.apply_profile_update(ProfileUpdate {
            email: Some("b@x.com".to_string()),
            ..Default::default()
        });
        repo.update(&user).await.unwrap();

        assert!(repo.get_by_email("a@x.com").await.unwrap().is_none());
        assert!(repo.get_by_email("b@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = InMemoryUserRepository::with_users(vec![
            create_test_user("user-1", "a@x.com"),
            create_test_user("user-2", "b@x.com"),
        ]);

        let mut user = repo.get_by_email("b@x.com").await.unwrap().unwrap();
        user.apply_profile_update(ProfileUpdate {
            email: Some("a@x.com".to_string()),
            ..Default::default()
        });

        let result = repo.update(&user).await;
        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let repo = InMemoryUserRepository::new();
        let result = repo.update(&create_test_user("ghost", "g@x.com")).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_by_reset_token() {
        let repo = InMemoryUserRepository::new();
        let mut user = create_test_user("user-1", "a@x.com");
        let now = Utc::now();
        user.begin_password_reset(PasswordReset::new("digest", now + Duration::minutes(15)));
        repo.create(user).await.unwrap();

        assert!(repo.get_by_reset_token("digest", now).await.unwrap().is_some());
        assert!(repo.get_by_reset_token("other", now).await.unwrap().is_none());
        assert!(repo
            .get_by_reset_token("digest", now + Duration::hours(1))
            .await
            .unwrap()
            .is_none());
    }
}
