//! Password hashing using argon2 or bcrypt
//!
//! New hashes use the configured scheme. Verification reads the scheme
//! from the stored hash, so switching schemes does not lock anyone out.
//!
//! # Performance Considerations
//!
//! Both schemes are intentionally CPU-intensive. In async contexts use
//! [`CredentialHasher::hash_async`] and [`CredentialHasher::verify_async`],
//! which run on the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};

/// bcrypt ignores every byte past this length
pub const BCRYPT_MAX_PASSWORD_LEN: usize = 72;

/// Hashing algorithm used for new password hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashScheme {
    /// Argon2id with the crate's default parameters
    #[default]
    Argon2,
    /// bcrypt in modular crypt format (`$2b$...`)
    Bcrypt,
}

impl HashScheme {
    /// Detect the scheme a stored hash was produced with
    pub fn detect(hash: &str) -> Self {
        if hash.starts_with("$2") {
            HashScheme::Bcrypt
        } else {
            HashScheme::Argon2
        }
    }
}

/// Salted one-way password hashing
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    scheme: HashScheme,
    bcrypt_cost: u32,
}

impl CredentialHasher {
    pub fn new(scheme: HashScheme, bcrypt_cost: u32) -> Self {
        Self { scheme, bcrypt_cost }
    }

    /// Scheme used for new hashes
    pub fn scheme(&self) -> HashScheme {
        self.scheme
    }

    /// Check that `password` can be hashed without losing bytes
    pub fn check_password(&self, password: &str) -> Result<(), String> {
        if self.scheme == HashScheme::Bcrypt && password.len() > BCRYPT_MAX_PASSWORD_LEN {
            return Err(format!(
                "Password must be at most {} bytes",
                BCRYPT_MAX_PASSWORD_LEN
            ));
        }
        Ok(())
    }

    /// Hash a password with a fresh random salt (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String> {
        self.check_password(password).map_err(anyhow::Error::msg)?;

        match self.scheme {
            HashScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
                Ok(hash.to_string())
            }
            HashScheme::Bcrypt => bcrypt::hash(password, self.bcrypt_cost)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e)),
        }
    }

    /// Hash a password asynchronously (non-blocking)
    ///
    /// Spawns the CPU-intensive work on a blocking thread pool,
    /// preventing it from blocking the async runtime.
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch and an error only when the stored
    /// hash cannot be parsed. A password longer than bcrypt can hash never
    /// matches a bcrypt hash.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        match HashScheme::detect(hash) {
            HashScheme::Argon2 => {
                let parsed_hash = PasswordHash::new(hash)
                    .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
                Ok(Argon2::default()
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok())
            }
            HashScheme::Bcrypt => {
                let valid = bcrypt::verify(password, hash)
                    .map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
                Ok(valid && password.len() <= BCRYPT_MAX_PASSWORD_LEN)
            }
        }
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(password: String, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}
