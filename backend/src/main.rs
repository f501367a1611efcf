//! Session Auth Backend
//!
//! Cookie-based session authentication over a relational user store.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Registration, login, sessions and password reset
//! - Repositories: User store access
//! - Database: SQLite with SQLx

use anyhow::{Context, Result};
use session_auth_backend::{config, db, logging, routes, state::AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::AppConfig::load()?;

    // Initialize tracing
    init_tracing(&config)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        hashing = ?config.hashing.scheme,
        "Starting Session Auth Backend"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Create database pool
    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

    if config.database.auto_migrate {
        info!("Running database migrations...");
        db::run_migrations(&db_pool).await?;
    }

    // Create application state
    let state = AppState::new(db_pool.clone(), config.clone());

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "Server listening");

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
///
/// Every line goes through the redacting writer, so PII fields never reach
/// stdout in clear text while redaction is enabled.
fn init_tracing(config: &config::AppConfig) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "session_auth_backend=info,tower_http=info".into()
        } else {
            "session_auth_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let redactor = logging::redactor_from_config(&config.logging)
        .context("Invalid redacted field list")?;
    // Colour codes would split `field=value` pairs
    let ansi = !redactor.is_active();
    let writer = logging::RedactingMakeWriter::new(std::io::stdout, redactor);

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .init();
    } else {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init();
    }

    Ok(())
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    // Sessions would vanish on restart
    if db::is_in_memory(&config.database.url) {
        errors.push("In-memory database cannot be used in production");
    }

    if config.session.cookie_name.trim().is_empty() {
        errors.push("Session cookie name must not be empty");
    }

    if !config.session.secure_cookie {
        warn!("Session cookie is not marked Secure - ensure TLS terminates upstream");
    }

    if !config.logging.redact {
        warn!("Log redaction is disabled - emails and tokens will be logged in clear text");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration: {}", errors.join(", "));
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
