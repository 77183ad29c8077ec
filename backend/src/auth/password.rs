//! Password hashing using argon2
//!
//! Provides salted password hashing and verification.
//!
//! # Performance Considerations
//!
//! Argon2 is intentionally CPU-intensive. Async callers go through the
//! `*_async` variants, which run on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use tracing::error;

/// Hash checked when the claimed account does not exist, so an unknown
/// email costs the same argon2 work as a wrong password.
///
/// Built by [`PasswordService::warm_up`] at startup.
static DUMMY_HASH: Lazy<Result<String, String>> = Lazy::new(|| {
    PasswordService::hash("fruit-pilot-timing-equalizer").map_err(|e| e.to_string())
});

/// Password hashing service
///
/// Uses Argon2id with the crate's default parameters.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(password: String) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a hash (blocking operation)
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Build the dummy hash so the first unknown-email login pays no extra hash
    pub fn warm_up() -> Result<()> {
        match Lazy::force(&DUMMY_HASH) {
            Ok(_) => Ok(()),
            Err(e) => Err(anyhow::anyhow!("Failed to build dummy password hash: {}", e)),
        }
    }

    /// Spend one verification against the dummy hash and discard the result
    pub async fn verify_dummy_async(password: String) {
        let _ = tokio::task::spawn_blocking(move || match DUMMY_HASH.as_ref() {
            Ok(hash) => {
                let _ = Self::verify(&password, hash);
            }
            Err(e) => error!("Dummy password hash unavailable: {}", e),
        })
        .await;
    }
}
