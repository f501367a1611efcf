//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.

use crate::auth::CredentialHasher;
use crate::config::AppConfig;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared application state
///
/// All fields are cheap to clone: the pool and config are reference
/// counted and the hasher is two words.
#[derive(Clone)]
pub struct AppState {
    /// User store connection pool
    pub db: SqlitePool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Password hasher built from the hashing config
    pub hasher: CredentialHasher,
}

impl AppState {
    /// Create a new application state
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        let hasher = CredentialHasher::new(config.hashing.scheme, config.hashing.bcrypt_cost);

        Self {
            db,
            config: Arc::new(config),
            hasher,
        }
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the password hasher
    #[inline]
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }
}
