//! Persistence seam for accounts and tasks
//!
//! [`AccountService`](crate::accounts::AccountService) talks to storage only
//! through [`UserStore`] and [`TaskStore`]. Two implementations ship with the
//! crate:
//!
//! - [`postgres`]: sqlx over a caller-supplied `PgPool`
//! - [`memory`]: in-process maps, for tests and local tooling
//!
//! Stores never validate or hash anything. They enforce exactly one rule
//! themselves: email uniqueness, reported as [`StoreError::DuplicateEmail`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{task::Task, user::User};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryTaskStore, MemoryUserStore};
pub use postgres::{PgTaskStore, PgUserStore};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another account already uses this email
    #[error("Email already exists")]
    DuplicateEmail,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Account persistence
///
/// Lookups return `Ok(None)` for a missing record; mutations of a missing
/// record return `Ok(None)` or `Ok(false)`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a fully prepared record
    async fn insert(&self, user: &User) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Exact match on the stored (already lower-cased) email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Account `id`, only if `token` is still in its token list
    async fn find_by_id_and_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>>;

    /// Overwrites name, email, password hash and age of `user.id`
    ///
    /// The token list is left alone; it is only changed through the token
    /// methods below.
    async fn update(&self, user: &User) -> StoreResult<Option<User>>;

    /// Appends `token` in a single write
    async fn append_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>>;

    /// Removes every occurrence of `token`
    async fn remove_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>>;

    /// Empties the token list
    async fn clear_tokens(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Task persistence, as far as accounts need it
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: &Task) -> StoreResult<Task>;

    /// Tasks owned by `owner`, oldest first
    async fn find_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Task>>;

    /// Deletes every task owned by `owner`, returning how many went
    async fn delete_by_owner(&self, owner: Uuid) -> StoreResult<u64>;
}
