//! Auth service: registration, login, sessions and password reset
//!
//! Per-user lifecycle: unregistered → registered → logged in → logged out
//! (a logged-out user is a registered user with no session id).
//!
//! # Performance
//!
//! Password hashing and verification run on the blocking thread pool.
//! Hashing always happens before a transaction is opened so no
//! connection is held during CPU-bound work.

use crate::auth::{new_id, CredentialHasher};
use crate::error::{AuthError, StoreError};
use crate::repositories::{UserFilter, UserRecord, UserRepository, UserUpdate};
use session_auth_shared::validation::{validate_email, validate_password};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

/// Auth service for session-based authentication
pub struct AuthService;

impl AuthService {
    /// Register a new user
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    pub async fn register(
        pool: &SqlitePool,
        hasher: &CredentialHasher,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        validate_email(email).map_err(AuthError::InvalidInput)?;
        validate_password(password).map_err(AuthError::InvalidInput)?;
        hasher
            .check_password(password)
            .map_err(AuthError::InvalidInput)?;

        if UserRepository::find_one(pool, &UserFilter::by_email(email))
            .await?
            .is_some()
        {
            return Err(AuthError::AlreadyExists(email.to_string()));
        }

        let hashed_password = hasher.hash_async(password.to_string()).await?;

        // A concurrent registration may win between the lookup and the insert
        let user = match UserRepository::add(pool, email, &hashed_password).await {
            Ok(user) => user,
            Err(StoreError::Duplicate) => return Err(AuthError::AlreadyExists(email.to_string())),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, email = %user.email, "User registered");
        Ok(user)
    }

    /// Check an email/password pair
    ///
    /// An unknown email is a failed login, not an error.
    pub async fn valid_login(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        let Some(user) = UserRepository::find_one(pool, &UserFilter::by_email(email)).await? else {
            debug!(email = %email, "Login attempt for unknown email");
            return Ok(false);
        };

        let valid =
            CredentialHasher::verify_async(password.to_string(), user.hashed_password).await?;

        if !valid {
            debug!(user_id = user.id, "Login attempt with wrong password");
        }
        Ok(valid)
    }

    /// Start a session for `email`, replacing any existing one
    ///
    /// Returns `None` when no user has that email.
    pub async fn create_session(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<Option<String>, AuthError> {
        let mut tx = pool.begin().await?;

        let Some(user) = UserRepository::find_one(&mut *tx, &UserFilter::by_email(email)).await?
        else {
            return Ok(None);
        };

        let session_id = new_id();
        UserRepository::update(
            &mut *tx,
            user.id,
            &UserUpdate {
                session_id: Some(Some(session_id.clone())),
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;

        info!(user_id = user.id, "Session created");
        Ok(Some(session_id))
    }

    /// Resolve a session id to its user
    pub async fn get_user_from_session(
        pool: &SqlitePool,
        session_id: Option<&str>,
    ) -> Result<Option<UserRecord>, AuthError> {
        let Some(session_id) = session_id.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        let user = UserRepository::find_one(pool, &UserFilter::by_session_id(session_id)).await?;
        Ok(user)
    }

    /// End the session of `user_id`
    pub async fn destroy_session(pool: &SqlitePool, user_id: i64) -> Result<(), AuthError> {
        UserRepository::update(
            pool,
            user_id,
            &UserUpdate {
                session_id: Some(None),
                ..Default::default()
            },
        )
        .await?;

        info!(user_id, "Session destroyed");
        Ok(())
    }

    /// Issue a password reset token for `email`
    ///
    /// A new request overwrites any previous token.
    pub async fn get_reset_password_token(
        pool: &SqlitePool,
        email: &str,
    ) -> Result<String, AuthError> {
        let mut tx = pool.begin().await?;

        let user = UserRepository::find_by(&mut *tx, &UserFilter::by_email(email)).await?;

        let reset_token = new_id();
        UserRepository::update(
            &mut *tx,
            user.id,
            &UserUpdate {
                reset_token: Some(Some(reset_token.clone())),
                ..Default::default()
            },
        )
        .await?;

        tx.commit().await?;

        info!(user_id = user.id, "Password reset token issued");
        Ok(reset_token)
    }

    /// Set a new password using a reset token
    ///
    /// The token is cleared on success and cannot be reused. Returns the
    /// user that held the token.
    pub async fn update_password(
        pool: &SqlitePool,
        hasher: &CredentialHasher,
        reset_token: &str,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        validate_password(password).map_err(AuthError::InvalidInput)?;
        hasher
            .check_password(password)
            .map_err(AuthError::InvalidInput)?;

        if UserRepository::find_one(pool, &UserFilter::by_reset_token(reset_token))
            .await?
            .is_none()
        {
            warn!("Password update with unknown reset token");
            return Err(AuthError::NotFound);
        }

        let hashed_password = hasher.hash_async(password.to_string()).await?;
        let user = UserRepository::consume_reset_token(pool, reset_token, &hashed_password).await?;

        info!(user_id = user.id, "Password updated");
        Ok(user)
    }
}
