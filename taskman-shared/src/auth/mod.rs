//! Authentication primitives
//!
//! - [`password`]: bcrypt password hashing and verification
//! - [`jwt`]: signed account tokens
//!
//! Both are plain functions; [`AccountService`](crate::accounts::AccountService)
//! wires them to the configured cost, secret and token lifetime.

pub mod jwt;
pub mod password;
