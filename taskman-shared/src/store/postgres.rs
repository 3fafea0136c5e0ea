//! PostgreSQL stores built on sqlx
//!
//! The pool is created and owned by the caller; these types only borrow a
//! clone of it. Table definitions are documented on
//! [`User`](crate::models::user::User) and [`Task`](crate::models::task::Task).
//!
//! # Example
//!
//! ```no_run
//! use sqlx::postgres::PgPoolOptions;
//! use taskman_shared::store::{PgUserStore, UserStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPoolOptions::new()
//!     .connect(&std::env::var("DATABASE_URL")?)
//!     .await?;
//!
//! let users = PgUserStore::new(pool);
//! let found = users.find_by_email("user@example.com").await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::{task::Task, user::User};

/// Maps a unique violation on the email constraint to `DuplicateEmail`
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.constraint().is_some_and(|c| c.contains("email")) {
            return StoreError::DuplicateEmail;
        }
    }

    StoreError::Database(err)
}

/// `users` table access
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: &User) -> StoreResult<User> {
        debug!(user_id = %user.id, "Inserting user");

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, password_hash, age, tokens, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, email, password_hash, age, tokens, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.tokens)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, tokens, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, tokens, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id_and_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, age, tokens, created_at, updated_at
            FROM users
            WHERE id = $1 AND $2 = ANY(tokens)
            "#,
        )
        .bind(id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update(&self, user: &User) -> StoreResult<Option<User>> {
        debug!(user_id = %user.id, "Updating user");

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, age = $5, updated_at = $6
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, tokens, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(updated)
    }

    async fn append_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET tokens = array_append(tokens, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, tokens, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET tokens = array_remove(tokens, $2), updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, tokens, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn clear_tokens(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET tokens = '{}', updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, age, tokens, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// `tasks` table access
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: &Task) -> StoreResult<Task> {
        let created = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (id, description, completed, owner, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, description, completed, owner, created_at, updated_at
            "#,
        )
        .bind(task.id)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.owner)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn find_by_owner(&self, owner: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, description, completed, owner, created_at, updated_at
            FROM tasks
            WHERE owner = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn delete_by_owner(&self, owner: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;

        debug!(owner = %owner, deleted = result.rows_affected(), "Deleted owned tasks");

        Ok(result.rows_affected())
    }
}
