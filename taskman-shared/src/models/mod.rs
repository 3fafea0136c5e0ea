//! Database models for Taskman
//!
//! # Models
//!
//! - `user`: user accounts and their credentials
//! - `task`: tasks, each owned by one account

pub mod task;
pub mod user;
