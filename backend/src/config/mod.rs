//! Configuration management for the session auth backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: AUTH__)

use crate::auth::HashScheme;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub hashing: HashingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Apply pending migrations on startup
    pub auto_migrate: bool,
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only)
    pub secure_cookie: bool,
}

/// Password hashing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashingConfig {
    pub scheme: HashScheme,
    pub bcrypt_cost: u32,
}

/// Log redaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub redact: bool,
    pub redacted_fields: Vec<String>,
    pub redaction: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            redact: true,
            redacted_fields: vec![
                "email".to_string(),
                "password".to_string(),
                "session_id".to_string(),
                "reset_token".to_string(),
            ],
            redaction: "***".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: "sqlite://auth.db".to_string(),
                max_connections: 5,
                auto_migrate: true,
            },
            session: SessionConfig {
                cookie_name: "session_id".to_string(),
                secure_cookie: false,
            },
            hashing: HashingConfig {
                scheme: HashScheme::Argon2,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with AUTH__ prefix
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);

        let config = config::Config::builder()
            // Start with defaults
            .add_source(config::Config::try_from(&AppConfig::default())?)
            // Load from environment-specific config file
            .add_source(
                config::File::with_name(&config_file)
                    .required(false)
            )
            // Override with environment variables (AUTH__ prefix)
            // e.g., AUTH__SERVER__PORT=9000 sets server.port
            .add_source(
                config::Environment::with_prefix("AUTH")
                    .separator("__")
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
