//! User repository for database operations
//!
//! Every function takes the executor first: a pool, a pooled connection
//! or an open transaction (`&mut *tx`). Callers decide the atomicity.

use crate::error::StoreError;
use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite};

const USER_COLUMNS: &str =
    "id, email, hashed_password, session_id, reset_token, created_at, updated_at";

/// User record from database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub hashed_password: String,
    pub session_id: Option<String>,
    pub reset_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lookup criteria, combined with AND
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub session_id: Option<String>,
    pub reset_token: Option<String>,
}

impl UserFilter {
    pub fn by_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Default::default()
        }
    }

    pub fn by_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    pub fn by_reset_token(reset_token: impl Into<String>) -> Self {
        Self {
            reset_token: Some(reset_token.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.email.is_none()
            && self.session_id.is_none()
            && self.reset_token.is_none()
    }
}

/// Fields to change on a user
///
/// The outer `Option` says whether to touch a column; for nullable
/// columns the inner `None` writes NULL.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub hashed_password: Option<String>,
    pub session_id: Option<Option<String>>,
    pub reset_token: Option<Option<String>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.hashed_password.is_none() && self.session_id.is_none() && self.reset_token.is_none()
    }
}

/// User repository for database operations
pub struct UserRepository;

impl UserRepository {
    /// Insert a new user and return the stored row
    pub async fn add<'c, E>(
        executor: E,
        email: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (email, hashed_password) VALUES (?, ?) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(hashed_password)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    /// Find the first user (lowest id) matching every set criterion
    pub async fn find_one<'c, E>(
        executor: E,
        filter: &UserFilter,
    ) -> Result<Option<UserRecord>, StoreError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        if filter.is_empty() {
            return Err(StoreError::InvalidQuery(
                "at least one lookup field is required".to_string(),
            ));
        }

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM users WHERE ", USER_COLUMNS));
        let mut separated = query.separated(" AND ");

        if let Some(id) = filter.id {
            separated.push("id = ");
            separated.push_bind_unseparated(id);
        }
        if let Some(ref email) = filter.email {
            separated.push("email = ");
            separated.push_bind_unseparated(email.as_str());
        }
        if let Some(ref session_id) = filter.session_id {
            separated.push("session_id = ");
            separated.push_bind_unseparated(session_id.as_str());
        }
        if let Some(ref reset_token) = filter.reset_token {
            separated.push("reset_token = ");
            separated.push_bind_unseparated(reset_token.as_str());
        }

        query.push(" ORDER BY id LIMIT 1");

        let user = query
            .build_query_as::<UserRecord>()
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    /// Find the first user matching `filter`, failing with `NotFound`
    pub async fn find_by<'c, E>(executor: E, filter: &UserFilter) -> Result<UserRecord, StoreError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        Self::find_one(executor, filter)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Apply `update` to the user with `id`
    ///
    /// An empty update still checks that the user exists.
    pub async fn update<'c, E>(executor: E, id: i64, update: &UserUpdate) -> Result<(), StoreError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut separated = query.separated(", ");

        if let Some(ref hashed_password) = update.hashed_password {
            separated.push("hashed_password = ");
            separated.push_bind_unseparated(hashed_password.as_str());
        }
        if let Some(ref session_id) = update.session_id {
            separated.push("session_id = ");
            separated.push_bind_unseparated(session_id.as_deref());
        }
        if let Some(ref reset_token) = update.reset_token {
            separated.push("reset_token = ");
            separated.push_bind_unseparated(reset_token.as_deref());
        }
        separated.push("updated_at = CURRENT_TIMESTAMP");

        query.push(" WHERE id = ");
        query.push_bind(id);

        let result = query.build().execute(executor).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// Replace the password of the user holding `reset_token` and clear the token
    ///
    /// A single conditional statement, so a token can be redeemed once
    /// even under concurrent requests.
    pub async fn consume_reset_token<'c, E>(
        executor: E,
        reset_token: &str,
        hashed_password: &str,
    ) -> Result<UserRecord, StoreError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users
             SET hashed_password = ?, reset_token = NULL, updated_at = CURRENT_TIMESTAMP
             WHERE id = (SELECT id FROM users WHERE reset_token = ? ORDER BY id LIMIT 1)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(hashed_password)
        .bind(reset_token)
        .fetch_optional(executor)
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(user)
    }
}
