//! Configuration management
//!
//! Loads settings from environment variables (and a `.env` file when present)
//! into a type-safe struct that is handed to the services at startup.
//!
//! # Environment Variables
//!
//! - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
//! - `JWT_TTL_HOURS`: Token lifetime in hours (default: 720, i.e. 30 days)
//! - `BCRYPT_COST`: bcrypt work factor (default: 8)
//! - `LOG_FILTER`: tracing filter directive (default: `taskman_shared=info`)
//! - `LOG_JSON`: emit JSON log lines when `true` (default: false)
//!
//! # Example
//!
//! ```no_run
//! use taskman_shared::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Hashing with cost {}", config.auth.bcrypt_cost);
//! # Ok(())
//! # }
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

use crate::auth::password::{DEFAULT_COST, MAX_COST, MIN_COST};

/// Minimum accepted length of the signing secret
pub const MIN_SECRET_LEN: usize = 32;

/// Default token lifetime: 30 days
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 30;

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Password and token settings
    pub auth: AuthConfig,

    /// Logging settings
    pub log: LogConfig,
}

/// Password hashing and token signing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for HS256 token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub jwt_secret: String,

    /// Lifetime of issued tokens, in hours
    pub token_ttl_hours: i64,

    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive
    pub filter: String,

    /// JSON output instead of the human-readable format
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "taskman_shared=info".to_string(),
            json: false,
        }
    }
}

impl AuthConfig {
    /// Builds an auth config with default cost and lifetime
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is shorter than [`MIN_SECRET_LEN`]
    pub fn new(jwt_secret: impl Into<String>) -> anyhow::Result<Self> {
        let config = Self {
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            bcrypt_cost: DEFAULT_COST,
        };
        config.check()?;
        Ok(config)
    }

    /// Same config with a different bcrypt cost
    pub fn with_bcrypt_cost(mut self, cost: u32) -> anyhow::Result<Self> {
        self.bcrypt_cost = cost;
        self.check()?;
        Ok(self)
    }

    /// Same config with a different token lifetime
    pub fn with_token_ttl_hours(mut self, hours: i64) -> anyhow::Result<Self> {
        self.token_ttl_hours = hours;
        self.check()?;
        Ok(self)
    }

    /// Lifetime of issued tokens
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.token_ttl_hours)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        if !(MIN_COST..=MAX_COST).contains(&self.bcrypt_cost) {
            anyhow::bail!(
                "BCRYPT_COST must be between {} and {}, got {}",
                MIN_COST,
                MAX_COST,
                self.bcrypt_cost
            );
        }

        if self.token_ttl_hours <= 0 {
            anyhow::bail!("JWT_TTL_HOURS must be positive");
        }

        Ok(())
    }
}

// The secret stays out of Debug output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or too short
    /// - A numeric variable does not parse or is out of range
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        let token_ttl_hours = lookup("JWT_TTL_HOURS")
            .map(|v| v.parse::<i64>())
            .transpose()?
            .unwrap_or(DEFAULT_TOKEN_TTL_HOURS);

        let bcrypt_cost = lookup("BCRYPT_COST")
            .map(|v| v.parse::<u32>())
            .transpose()?
            .unwrap_or(DEFAULT_COST);

        let auth = AuthConfig::new(jwt_secret)?
            .with_bcrypt_cost(bcrypt_cost)?
            .with_token_ttl_hours(token_ttl_hours)?;

        let defaults = LogConfig::default();
        let log = LogConfig {
            filter: lookup("LOG_FILTER").unwrap_or(defaults.filter),
            json: lookup("LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.json),
        };

        Ok(Self { auth, log })
    }
}
