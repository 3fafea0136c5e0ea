//! In-process stores
//!
//! Behave like the PostgreSQL stores, including the unique email rule, but
//! keep everything in maps behind a `tokio` lock. Each mutation happens inside
//! one write-lock section, so concurrent token appends are all kept.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{task::Task, user::User};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Applies `change` to account `id` and bumps `updated_at`
    async fn modify<F>(&self, id: Uuid, change: F) -> StoreResult<Option<User>>
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|user| {
            change(user);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Uuid) -> bool {
    users.values().any(|u| u.id != except && u.email == email)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: &User) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if email_taken(&users, &user.email, user.id) {
            return Err(StoreError::DuplicateEmail);
        }

        users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id_and_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).filter(|u| u.has_token(token)).cloned())
    }

    async fn update(&self, user: &User) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Ok(None);
        }
        if email_taken(&users, &user.email, user.id) {
            return Err(StoreError::DuplicateEmail);
        }

        let stored = users.get_mut(&user.id).map(|existing| {
            existing.name = user.name.clone();
            existing.email = user.email.clone();
            existing.password_hash = user.password_hash.clone();
            existing.age = user.age;
            existing.updated_at = user.updated_at;
            existing.clone()
        });

        Ok(stored)
    }

    async fn append_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let token = token.to_string();
        self.modify(id, move |user| user.tokens.push(token)).await
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        self.modify(id, |user| user.tokens.retain(|t| t != token)).await
    }

    async fn clear_tokens(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.modify(id, |user| user.tokens.clear()).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: &Task) -> StoreResult<Task> {
        self.tasks.write().await.push(task.clone());
        Ok(task.clone())
    }

    async fn find_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().filter(|t| t.owner == owner).cloned().collect())
    }

    async fn delete_by_owner(&self, owner: Uuid) -> StoreResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.owner != owner);
        Ok((before - tasks.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "$2b$04$hash".to_string(),
            age: 0,
            tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email() {
        let store = MemoryUserStore::new();
        store.insert(&user("a@example.com")).await.unwrap();

        let result = store.insert(&user("a@example.com")).await;
        assert!(matches!(result, Err(StoreError::DuplicateEmail)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_other_account() {
        let store = MemoryUserStore::new();
        store.insert(&user("a@example.com")).await.unwrap();
        let mut b = store.insert(&user("b@example.com")).await.unwrap();

        b.email = "a@example.com".to_string();
        assert!(matches!(store.update(&b).await, Err(StoreError::DuplicateEmail)));

        // Keeping its own email is fine
        b.email = "b@example.com".to_string();
        b.age = 30;
        let updated = store.update(&b).await.unwrap().unwrap();
        assert_eq!(updated.age, 30);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_tokens() {
        let store = MemoryUserStore::new();
        let mut a = store.insert(&user("a@example.com")).await.unwrap();
        store.append_token(a.id, "t1").await.unwrap();

        a.tokens.clear();
        a.name = "Renamed".to_string();
        let updated = store.update(&a).await.unwrap().unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.tokens, vec!["t1".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_account_mutations() {
        let store = MemoryUserStore::new();
        let ghost = user("ghost@example.com");

        assert!(store.update(&ghost).await.unwrap().is_none());
        assert!(store.append_token(ghost.id, "t").await.unwrap().is_none());
        assert!(!store.delete(ghost.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_token_lifecycle() {
        let store = MemoryUserStore::new();
        let a = store.insert(&user("a@example.com")).await.unwrap();

        store.append_token(a.id, "t1").await.unwrap();
        store.append_token(a.id, "t2").await.unwrap();
        assert!(store.find_by_id_and_token(a.id, "t1").await.unwrap().is_some());

        let after = store.remove_token(a.id, "t1").await.unwrap().unwrap();
        assert_eq!(after.tokens, vec!["t2".to_string()]);
        assert!(store.find_by_id_and_token(a.id, "t1").await.unwrap().is_none());

        let cleared = store.clear_tokens(a.id).await.unwrap().unwrap();
        assert!(cleared.tokens.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_kept() {
        let store = Arc::new(MemoryUserStore::new());
        let id = store.insert(&user("a@example.com")).await.unwrap().id;

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.append_token(id, &format!("t{}", i)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.tokens.len(), 16);
    }

    #[tokio::test]
    async fn test_tasks_by_owner() {
        let store = MemoryTaskStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        for (description, who) in [("one", owner), ("two", owner), ("three", other)] {
            let now = Utc::now();
            store
                .insert(&Task {
                    id: Uuid::new_v4(),
                    description: description.to_string(),
                    completed: false,
                    owner: who,
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        let owned = store.find_by_owner(owner).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].description, "one");

        assert_eq!(store.delete_by_owner(owner).await.unwrap(), 2);
        assert!(store.find_by_owner(owner).await.unwrap().is_empty());
        assert_eq!(store.find_by_owner(other).await.unwrap().len(), 1);
    }
}
