//! Error types for account operations
//!
//! Every [`AccountService`](crate::accounts::AccountService) operation returns
//! [`AccountResult`]. Validation failures name the offending field;
//! authentication failures are deliberately generic.

use validator::ValidationErrors;

use crate::auth::{jwt::JwtError, password::PasswordError};
use crate::store::StoreError;

/// Result alias for account operations
pub type AccountResult<T> = Result<T, AccountError>;

/// Message used for every failed login, whatever the cause
pub const LOGIN_FAILED: &str = "Unable to login";

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// A field failed validation before anything was persisted
    #[error("Validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    /// Unknown account, wrong password, or an unusable token
    #[error("Unable to login")]
    Authentication,

    /// The account to update or delete does not exist
    #[error("Account not found")]
    NotFound,

    /// Store failure, propagated unchanged
    #[error(transparent)]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl AccountError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Picks the first failing field, in `field_order`, out of `errors`
    ///
    /// Fields not listed in `field_order` are considered after the listed ones,
    /// sorted by name.
    pub fn from_validation(errors: &ValidationErrors, field_order: &[&str]) -> Self {
        let mut failures: Vec<_> = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, field_errors)| {
                let field = field.to_string();
                let rank = field_order
                    .iter()
                    .position(|listed| *listed == field)
                    .unwrap_or(field_order.len());
                field_errors.first().map(|error| (rank, field, error))
            })
            .collect();
        failures.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

        match failures.into_iter().next() {
            Some((_, field, error)) => {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", error.code));
                Self::validation(field, message)
            }
            None => Self::validation("unknown", "Validation failed"),
        }
    }

    /// True for the generic login failure
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
