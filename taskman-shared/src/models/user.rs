//! User account model
//!
//! The account is the only entity that holds credentials. Its password is kept
//! as a bcrypt hash and, together with the issued tokens, is left out of every
//! serialized form of the struct.
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id UUID PRIMARY KEY,
//!     name VARCHAR(255) NOT NULL,
//!     email VARCHAR(255) NOT NULL,
//!     password_hash VARCHAR(255) NOT NULL,
//!     age INTEGER NOT NULL DEFAULT 0 CHECK (age >= 0),
//!     tokens TEXT[] NOT NULL DEFAULT '{}',
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     CONSTRAINT users_email_key UNIQUE (email)
//! );
//! ```
//!
//! # Example
//!
//! ```
//! use taskman_shared::models::user::NewUser;
//!
//! let signup = NewUser {
//!     name: "  Ada Lovelace ".to_string(),
//!     email: " Ada@Example.COM ".to_string(),
//!     password: "analytical-engine".to_string(),
//!     age: 36,
//! }
//! .normalized();
//!
//! assert_eq!(signup.name, "Ada Lovelace");
//! assert_eq!(signup.email, "ada@example.com");
//! assert!(signup.check().is_ok());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::AccountError;

/// Order in which field violations are reported
const FIELD_ORDER: [&str; 4] = ["name", "email", "password", "age"];

/// User account
///
/// `Serialize` produces the output representation: `password_hash` and
/// `tokens` are never written.
#[derive(Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name (trimmed, non-empty)
    pub name: String,

    /// Email address, trimmed and lower-cased
    ///
    /// Unique across all accounts
    pub email: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Age in years, never negative
    pub age: i32,

    /// Issued bearer tokens, oldest first
    #[serde(skip_serializing)]
    pub tokens: Vec<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last saved
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Output representation of the account, without secrets
    pub fn to_output(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "age": self.age,
            "created_at": self.created_at,
            "updated_at": self.updated_at,
        })
    }

    /// Whether `token` is among the account's live tokens
    pub fn has_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

// Hand-written so credentials never reach log output.
impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("age", &self.age)
            .field("tokens", &self.tokens.len())
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Input for creating a new account
///
/// `password` is plaintext here; it is hashed before the record reaches a
/// store.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    #[validate(
        length(min = 7, message = "Minimum length of password must be 7 characters"),
        custom(function = "reject_password_word")
    )]
    pub password: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: i32,
}

impl NewUser {
    /// Trims every text field and lower-cases the email
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
            age: self.age,
        }
    }

    /// Validates the (normalized) input, reporting the first failing field
    pub fn check(&self) -> Result<(), AccountError> {
        self.validate()
            .map_err(|errors| AccountError::from_validation(&errors, &FIELD_ORDER))
    }
}

/// Input for updating an existing account
///
/// Only `Some` fields are changed. A new password is re-validated and
/// re-hashed; leaving it `None` keeps the stored hash untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    #[validate(
        length(min = 7, message = "Minimum length of password must be 7 characters"),
        custom(function = "reject_password_word")
    )]
    pub password: Option<String>,

    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl UpdateUser {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            password: self.password.map(|p| p.trim().to_string()),
            age: self.age,
        }
    }

    pub fn check(&self) -> Result<(), AccountError> {
        self.validate()
            .map_err(|errors| AccountError::from_validation(&errors, &FIELD_ORDER))
    }

    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.age.is_none()
    }
}

/// Canonical form of an email address: trimmed and lower-cased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Rejects passwords containing the word "password" in any case
fn reject_password_word(password: &str) -> Result<(), ValidationError> {
    if password.to_lowercase().contains("password") {
        let mut error = ValidationError::new("forbidden_word");
        error.message = Some("Password cannot contain the word \"password\"".into());
        return Err(error);
    }

    Ok(())
}
