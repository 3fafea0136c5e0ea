//! # Taskman Shared Library
//!
//! Account model and authentication helpers for the Taskman backend.
//!
//! ## Module Organization
//!
//! - `accounts`: account operations (signup, update, login, tokens, deletion)
//! - `models`: the `User` and `Task` entities and their input types
//! - `auth`: password hashing and signed tokens
//! - `store`: persistence traits with PostgreSQL and in-memory backends
//! - `config`: environment configuration
//! - `telemetry`: tracing subscriber setup
//! - `error`: account error taxonomy

pub mod accounts;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod telemetry;

pub use accounts::AccountService;
pub use error::{AccountError, AccountResult};

/// Current version of the Taskman shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
