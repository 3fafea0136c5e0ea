//! Account operations
//!
//! [`AccountService`] is the only place where the account rules come
//! together. Every write goes through the same steps:
//!
//! ```text
//! normalize (trim, lower-case email)
//!   └─> validate (first failing field wins)
//!         └─> hash the password, if one was supplied
//!               └─> persist through the UserStore
//! ```
//!
//! Login failures are reported as one generic
//! [`AccountError::Authentication`], whether the email is unknown, the
//! password is wrong, or a token is unusable.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use taskman_shared::accounts::AccountService;
//! use taskman_shared::config::AuthConfig;
//! use taskman_shared::models::user::NewUser;
//! use taskman_shared::store::{MemoryTaskStore, MemoryUserStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let accounts = AccountService::new(
//!     Arc::new(MemoryUserStore::new()),
//!     Arc::new(MemoryTaskStore::new()),
//!     AuthConfig::new("a-secret-of-at-least-thirty-two-bytes")?,
//! );
//!
//! let mut user = accounts
//!     .create(NewUser {
//!         name: "Ada".to_string(),
//!         email: "ada@example.com".to_string(),
//!         password: "analytical".to_string(),
//!         age: 36,
//!     })
//!     .await?;
//!
//! let token = accounts.issue_token(&mut user).await?;
//! let same = accounts.authenticate_token(&token).await?;
//! assert_eq!(same.id, user.id);
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{
    jwt::{create_token, validate_token, Claims},
    password::{hash_password, verify_password},
};
use crate::config::AuthConfig;
use crate::error::{AccountError, AccountResult};
use crate::models::{
    task::Task,
    user::{normalize_email, NewUser, UpdateUser, User},
};
use crate::store::{StoreError, TaskStore, UserStore};

/// Account operations over injected stores and auth settings
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
    auth: AuthConfig,
}

/// Reports a duplicate email as a validation failure on `email`
fn map_write_error(err: StoreError) -> AccountError {
    match err {
        StoreError::DuplicateEmail => AccountError::validation("email", "Email is already registered"),
        other => AccountError::Persistence(other),
    }
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>, auth: AuthConfig) -> Self {
        Self { users, tasks, auth }
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `AccountError::Validation` for any invalid field, including an email
    ///   that is already registered
    /// - `AccountError::Persistence` if the store fails
    pub async fn create(&self, data: NewUser) -> AccountResult<User> {
        let data = data.normalized();
        data.check()?;

        let password_hash = hash_password(&data.password, self.auth.bcrypt_cost)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash,
            age: data.age,
            tokens: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.users.insert(&user).await.map_err(map_write_error)?;

        info!(user_id = %created.id, "Account created");
        Ok(created)
    }

    /// Applies `changes` to account `id`
    ///
    /// The password hash is recomputed only when `changes.password` is set.
    /// An empty change set returns the stored account unchanged.
    pub async fn update(&self, id: Uuid, changes: UpdateUser) -> AccountResult<User> {
        let changes = changes.normalized();
        changes.check()?;

        let mut user = self.find_by_id(id).await?;
        if changes.is_empty() {
            return Ok(user);
        }

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(age) = changes.age {
            user.age = age;
        }
        let password_changed = changes.password.is_some();
        if let Some(password) = changes.password {
            user.password_hash = hash_password(&password, self.auth.bcrypt_cost)?;
        }
        user.updated_at = Utc::now();

        let updated = self
            .users
            .update(&user)
            .await
            .map_err(map_write_error)?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = %id, password_changed, "Account updated");
        Ok(updated)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AccountResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)
    }

    /// Signs a new token for `user`, stores it and returns it
    ///
    /// `user` is refreshed from the store, so afterwards its token list ends
    /// with the new token.
    pub async fn issue_token(&self, user: &mut User) -> AccountResult<String> {
        let claims = Claims::new(user.id, self.auth.token_ttl());
        let token = create_token(&claims, &self.auth.jwt_secret)?;

        *user = self
            .users
            .append_token(user.id, &token)
            .await?
            .ok_or(AccountError::NotFound)?;

        debug!(user_id = %user.id, token_count = user.tokens.len(), "Issued auth token");
        Ok(token)
    }

    /// Looks up an account by email and checks its password
    ///
    /// # Errors
    ///
    /// `AccountError::Authentication` when the email is unknown or the
    /// password does not match. Store failures are propagated.
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountResult<User> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("Login failed");
            return Err(AccountError::Authentication);
        };

        match verify_password(password.trim(), &user.password_hash) {
            Ok(true) => Ok(user),
            Ok(false) => {
                warn!(user_id = %user.id, "Login failed");
                Err(AccountError::Authentication)
            }
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                Err(AccountError::Authentication)
            }
        }
    }

    /// Authenticates by credentials and issues a token in one step
    pub async fn login(&self, email: &str, password: &str) -> AccountResult<(User, String)> {
        let mut user = self.authenticate(email, password).await?;
        let token = self.issue_token(&mut user).await?;

        info!(user_id = %user.id, "Logged in");
        Ok((user, token))
    }

    /// Resolves a bearer token to its account
    ///
    /// The token must carry a valid signature, must not be expired, and must
    /// still be in the account's token list.
    pub async fn authenticate_token(&self, token: &str) -> AccountResult<User> {
        let claims = validate_token(token, &self.auth.jwt_secret).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AccountError::Authentication
        })?;

        self.users
            .find_by_id_and_token(claims.sub, token)
            .await?
            .ok_or(AccountError::Authentication)
    }

    /// Removes one token from `user` (logout)
    pub async fn revoke_token(&self, user: &mut User, token: &str) -> AccountResult<()> {
        *user = self
            .users
            .remove_token(user.id, token)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = %user.id, "Token revoked");
        Ok(())
    }

    /// Removes every token from `user` (logout everywhere)
    pub async fn revoke_all_tokens(&self, user: &mut User) -> AccountResult<()> {
        *user = self
            .users
            .clear_tokens(user.id)
            .await?
            .ok_or(AccountError::NotFound)?;

        info!(user_id = %user.id, "All tokens revoked");
        Ok(())
    }

    /// Tasks owned by account `id`
    pub async fn tasks(&self, id: Uuid) -> AccountResult<Vec<Task>> {
        Ok(self.tasks.find_by_owner(id).await?)
    }

    /// Deletes account `id` together with the tasks it owns
    pub async fn delete(&self, id: Uuid) -> AccountResult<()> {
        self.find_by_id(id).await?;

        let removed_tasks = self.tasks.delete_by_owner(id).await?;
        if !self.users.delete(id).await? {
            return Err(AccountError::NotFound);
        }

        info!(user_id = %id, removed_tasks, "Account deleted");
        Ok(())
    }
}
