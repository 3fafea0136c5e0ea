//! Password hashing module using bcrypt
//!
//! Account passwords are stored as salted bcrypt digests. The work factor
//! (cost) is configurable through [`AuthConfig`](crate::config::AuthConfig)
//! and defaults to [`DEFAULT_COST`].
//!
//! # Example
//!
//! ```
//! use taskman_shared::auth::password::{hash_password, verify_password, DEFAULT_COST};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hash = hash_password("red-kite-42", DEFAULT_COST)?;
//!
//! assert!(verify_password("red-kite-42", &hash)?);
//! assert!(!verify_password("blue-kite-42", &hash)?);
//! # Ok(())
//! # }
//! ```

/// Default bcrypt work factor for account passwords
pub const DEFAULT_COST: u32 = 8;

/// Lowest cost accepted by bcrypt
pub const MIN_COST: u32 = 4;

/// Highest cost accepted by bcrypt
pub const MAX_COST: u32 = 31;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),

    /// Work factor outside the range bcrypt supports
    #[error("Invalid bcrypt cost {0}, expected 4..=31")]
    InvalidCost(u32),
}

/// Hashes a password with bcrypt using the given cost
///
/// A fresh 16-byte salt is generated for every call, so hashing the same
/// password twice yields different strings.
///
/// # Errors
///
/// Returns `PasswordError::InvalidCost` for a cost outside `4..=31` and
/// `PasswordError::HashError` if bcrypt fails.
pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    if !(MIN_COST..=MAX_COST).contains(&cost) {
        return Err(PasswordError::InvalidCost(cost));
    }

    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Verifies a plaintext password against a stored bcrypt hash
///
/// Returns `Ok(false)` on mismatch. A hash that cannot be parsed is an error,
/// not a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_uses_cost() {
        let hash = hash_password("test_secret_123", DEFAULT_COST).expect("Hash should succeed");

        // $2b$08$<22 salt chars><31 hash chars>
        assert!(hash.starts_with("$2b$08$"), "unexpected hash prefix: {}", hash);
        assert_eq!(hash.len(), 60);
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_secret", MIN_COST).expect("Hash 1 should succeed");
        let hash2 = hash_password("same_secret", MIN_COST).expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_hash_password_rejects_bad_cost() {
        assert!(matches!(
            hash_password("whatever1", 3),
            Err(PasswordError::InvalidCost(3))
        ));
        assert!(matches!(
            hash_password("whatever1", 32),
            Err(PasswordError::InvalidCost(32))
        ));
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("correct_secret", MIN_COST).expect("Hash should succeed");

        let result = verify_password("correct_secret", &hash).expect("Verify should succeed");
        assert!(result, "Correct password should verify");
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_secret", MIN_COST).expect("Hash should succeed");

        assert!(!verify_password("wrong_secret", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("secret", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn test_hash_verify_unicode() {
        let hash = hash_password("unicode-密码-パスワード", MIN_COST).unwrap();
        assert!(verify_password("unicode-密码-パスワード", &hash).unwrap());
    }
}
