//! Common test utilities for integration tests
//!
//! Each `TestApp` owns a private in-memory SQLite store, so tests never
//! share state and need no external database.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use session_auth_backend::{
    auth::HashScheme,
    config::{AppConfig, DatabaseConfig},
    db, routes,
    state::AppState,
};
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Response pieces the tests look at
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }

    /// `name=value` part of the first `Set-Cookie` header
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_string())
    }
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub pool: SqlitePool,
}

impl TestApp {
    /// Create a new test application backed by an in-memory store
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let pool = db::create_pool(&config.database.url, config.database.max_connections)
            .await
            .expect("Failed to create test database pool");

        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), config);
        let app = routes::create_router(state);

        Self { app, pool }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send("GET", path, cookie, None).await
    }

    /// Make a POST request with a form body
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send("POST", path, None, Some(encode_form(form))).await
    }

    /// Make a PUT request with a form body
    pub async fn put_form(&self, path: &str, form: &[(&str, &str)]) -> TestResponse {
        self.send("PUT", path, None, Some(encode_form(form))).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send("DELETE", path, cookie, None).await
    }

    /// Register `email`, log in and return the session cookie
    pub async fn login_as(&self, email: &str, password: &str) -> String {
        let response = self
            .post_form("/users", &[("email", email), ("password", password)])
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        let response = self
            .post_form("/sessions", &[("email", email), ("password", password)])
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        response.session_cookie().expect("login sets a cookie")
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        form: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let request = builder.body(body).unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Encode `form` as an `application/x-www-form-urlencoded` body
fn encode_form(form: &[(&str, &str)]) -> String {
    form.iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        auto_migrate: true,
    };
    config.hashing.scheme = HashScheme::Argon2;
    config.hashing.bcrypt_cost = 4;
    config
}
