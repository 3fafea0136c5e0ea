//! Task model
//!
//! Tasks belong to exactly one account through `owner`. The account never
//! stores its tasks; they are looked up by owner id when needed.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY,
//!     description TEXT NOT NULL,
//!     completed BOOLEAN NOT NULL DEFAULT FALSE,
//!     owner UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//!
//! CREATE INDEX idx_tasks_owner ON tasks(owner);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AccountError;

/// Task owned by an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,

    /// What needs doing (trimmed, non-empty)
    pub description: String,

    pub completed: bool,

    /// Owning account
    pub owner: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn normalized(self) -> Self {
        Self {
            description: self.description.trim().to_string(),
            completed: self.completed,
        }
    }

    pub fn check(&self) -> Result<(), AccountError> {
        self.validate()
            .map_err(|errors| AccountError::from_validation(&errors, &["description"]))
    }

    /// Builds the record for `owner`, stamped with the current time
    pub fn into_task(self, owner: Uuid) -> Task {
        let now = Utc::now();

        Task {
            id: Uuid::new_v4(),
            description: self.description,
            completed: self.completed,
            owner,
            created_at: now,
            updated_at: now,
        }
    }
}
