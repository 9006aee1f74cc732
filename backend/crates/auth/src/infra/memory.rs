//! In-Memory Repository Implementation
//!
//! Process-local account directory for development without a database and
//! for tests. Contents are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, email::Email};
use crate::error::{AuthError, AuthResult};

/// In-memory user repository
///
/// Cloning shares the same underlying map.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> AuthResult<()> {
        // Check and insert under one write lock
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::DuplicateEmail);
        }

        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_name::UserName;
    use platform::password::{ClearTextPassword, CredentialHasher, HasherConfig};

    fn user(email: &str) -> User {
        let hasher = CredentialHasher::new(HasherConfig::low_cost()).unwrap();
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        User::new(
            Email::new(email).unwrap(),
            UserName::new("Alice").unwrap(),
            hasher.hash(&password).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();
        let alice = user("alice@example.com");
        repo.insert(&alice).await.unwrap();

        let by_email = repo
            .find_by_email(&Email::new("ALICE@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.user_id, alice.user_id);

        let by_id = repo.find_by_id(&alice.user_id).await.unwrap().unwrap();
        assert_eq!(by_id.email, alice.email);

        assert!(repo.find_by_id(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("alice@example.com")).await.unwrap();

        let err = repo.insert(&user("Alice@Example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateEmail));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_same_email() {
        let repo = InMemoryUserRepository::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                let candidate = user("race@example.com");
                tokio::spawn(async move { repo.insert(&candidate).await })
            })
            .collect();

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(repo.len().await, 1);
    }
}
