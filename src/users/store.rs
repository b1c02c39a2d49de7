use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::users::repo_types::User;
use crate::users::services::normalize_email;

/// Persistence for [`User`] records keyed by email.
///
/// `save` upserts: an existing record with the same email is overwritten.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn save(&self, user: &User) -> Result<()>;
    async fn load_by_email(&self, email: &str) -> Result<User>;
    async fn delete_by_email(&self, email: &str) -> Result<bool>;
    async fn count(&self) -> Result<u64>;
}

impl User {
    pub async fn save_to_db(&self, store: &dyn UserStore) -> Result<()> {
        store.save(self).await
    }

    pub async fn load_by_email(store: &dyn UserStore, email: &str) -> Result<User> {
        store.load_by_email(email).await
    }
}

/// In-process store with the same semantics as the PostgreSQL one.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn save(&self, user: &User) -> Result<()> {
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        let replaced = users.insert(user.email().to_string(), user.clone()).is_some();
        debug!(email = %user.email(), replaced, "user saved in memory");
        Ok(())
    }

    async fn load_by_email(&self, email: &str) -> Result<User> {
        let email = normalize_email(email);
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        match users.get(&email) {
            Some(user) => Ok(user.clone()),
            None => {
                warn!(email = %email, "user not found");
                Err(Error::NotFound { email })
            }
        }
    }

    async fn delete_by_email(&self, email: &str) -> Result<bool> {
        let email = normalize_email(email);
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.remove(&email).is_some())
    }

    async fn count(&self) -> Result<u64> {
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        Ok(users.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn farah() -> User {
        User::new("farah@email.com", "Farah", "Islam", None).unwrap()
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let store = MemoryUserStore::new();
        let user = User::new("ada@example.org", "Ada", "Lovelace", Some("math")).unwrap();
        user.save_to_db(&store).await.unwrap();

        let loaded = User::load_by_email(&store, "ada@example.org").await.unwrap();
        assert_eq!(loaded, user);
        assert_eq!(loaded.note(), Some("math"));
    }

    #[tokio::test]
    async fn example_scenario() {
        let store = MemoryUserStore::new();
        farah().save_to_db(&store).await.unwrap();

        let loaded = User::load_by_email(&store, "farah@email.com").await.unwrap();
        assert_eq!(loaded.email(), "farah@email.com");
        assert_eq!(loaded.first_name(), "Farah");
        assert_eq!(loaded.last_name(), "Islam");
        assert_eq!(loaded.to_string(), "<User farah@email.com: Farah Islam>");
    }

    #[tokio::test]
    async fn save_same_email_overwrites() {
        let store = MemoryUserStore::new();
        farah().save_to_db(&store).await.unwrap();
        let renamed = User::new("FARAH@email.com", "Farah", "Rahman", Some("moved")).unwrap();
        renamed.save_to_db(&store).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let loaded = User::load_by_email(&store, "farah@email.com").await.unwrap();
        assert_eq!(loaded, renamed);
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let store = MemoryUserStore::new();
        farah().save_to_db(&store).await.unwrap();

        let err = User::load_by_email(&store, "nobody@email.com").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(matches!(err, Error::NotFound { ref email } if email == "nobody@email.com"));
    }

    #[tokio::test]
    async fn load_is_idempotent() {
        let store = MemoryUserStore::new();
        farah().save_to_db(&store).await.unwrap();

        let first = store.load_by_email("farah@email.com").await.unwrap();
        let second = store.load_by_email("farah@email.com").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn lookup_key_is_normalized() {
        let store = MemoryUserStore::new();
        farah().save_to_db(&store).await.unwrap();
        assert!(store.load_by_email("  Farah@Email.com").await.is_ok());
    }

    #[tokio::test]
    async fn deserialized_user_round_trips() {
        let store = MemoryUserStore::new();
        let user: User = serde_json::from_str(
            r#"{"email":"Farah@Email.com","first_name":"Farah","last_name":"Islam","note":null}"#,
        )
        .unwrap();
        user.save_to_db(&store).await.unwrap();

        let loaded = User::load_by_email(&store, "Farah@Email.com").await.unwrap();
        assert_eq!(loaded, user);
        assert_eq!(loaded.email(), "farah@email.com");
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemoryUserStore::new();
        farah().save_to_db(&store).await.unwrap();

        assert!(store.delete_by_email("farah@email.com").await.unwrap());
        assert!(!store.delete_by_email("farah@email.com").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.load_by_email("farah@email.com").await.is_err());
    }
}
