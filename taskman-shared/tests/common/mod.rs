/// Common test utilities for integration tests
///
/// - Account service wired to in-memory stores
/// - Signup fixtures
/// - One-time tracing setup

use std::sync::{Arc, Once};
use taskman_shared::accounts::AccountService;
use taskman_shared::config::{AuthConfig, LogConfig};
use taskman_shared::models::user::NewUser;
use taskman_shared::store::{MemoryTaskStore, MemoryUserStore};
use taskman_shared::telemetry::init_tracing;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

static TRACING: Once = Once::new();

/// Service plus direct handles on its stores
pub struct TestContext {
    pub accounts: AccountService,
    pub users: Arc<MemoryUserStore>,
    pub tasks: Arc<MemoryTaskStore>,
}

impl TestContext {
    /// Fast hashing (cost 4) for tests that do not care about the work factor
    pub fn new() -> Self {
        let auth = AuthConfig::new(TEST_SECRET)
            .and_then(|a| a.with_bcrypt_cost(4))
            .expect("valid test auth config");
        Self::with_auth(auth)
    }

    pub fn with_auth(auth: AuthConfig) -> Self {
        TRACING.call_once(|| {
            let _ = init_tracing(&LogConfig {
                filter: "taskman_shared=debug".to_string(),
                json: false,
            });
        });

        let users = Arc::new(MemoryUserStore::new());
        let tasks = Arc::new(MemoryTaskStore::new());
        let accounts = AccountService::new(users.clone(), tasks.clone(), auth);

        Self {
            accounts,
            users,
            tasks,
        }
    }
}

/// A signup that passes validation
pub fn signup(email: &str) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        password: "red-12345".to_string(),
        age: 27,
    }
}
