//! Integration tests for the register / login / profile / reset flow

mod common;

use axum::http::{header, StatusCode};

const EMAIL: &str = "guillaume@example.com";
const PASSWORD: &str = "b0bth3build3r";
const NEW_PASSWORD: &str = "t4rt1fl3tt3";

#[tokio::test]
async fn test_full_session_lifecycle() {
    let app = common::TestApp::new().await;

    // Register
    let response = app
        .post_form("/users", &[("email", EMAIL), ("password", PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["email"], EMAIL);
    assert_eq!(body["message"], "user created");

    // Wrong password
    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", "nope")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.session_cookie().is_none());

    // Profile without a session
    let response = app.get("/profile", None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Log in
    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "logged in");
    let cookie = response.session_cookie().expect("login sets a cookie");
    assert!(cookie.starts_with("session_id="));
    let set_cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));

    // Profile with the session
    let response = app.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["email"], EMAIL);

    // Log out
    let response = app.delete("/sessions", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.headers[header::LOCATION], "/");

    // The old session id is dead
    let response = app.get("/profile", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    // Reset the password
    let response = app
        .post_form("/reset_password", &[("email", EMAIL)])
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["email"], EMAIL);
    let reset_token = body["reset_token"].as_str().unwrap().to_string();

    let response = app
        .put_form(
            "/reset_password",
            &[
                ("email", EMAIL),
                ("reset_token", &reset_token),
                ("new_password", NEW_PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Password updated");

    // Old password no longer works, new one does
    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", NEW_PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = common::TestApp::new().await;

    let form = [("email", EMAIL), ("password", PASSWORD)];
    let response = app.post_form("/users", &form).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app.post_form("/users", &form).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "email already registered");
}

#[tokio::test]
async fn test_register_invalid_email() {
    let app = common::TestApp::new().await;

    let response = app
        .post_form("/users", &[("email", "not-an-email"), ("password", PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_missing_field_is_rejected() {
    let app = common::TestApp::new().await;

    let response = app.post_form("/users", &[("email", EMAIL)]).await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_login_unknown_email() {
    let app = common::TestApp::new().await;

    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_second_login_replaces_session() {
    let app = common::TestApp::new().await;
    let first = app.login_as(EMAIL, PASSWORD).await;

    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", PASSWORD)])
        .await;
    let second = response.session_cookie().unwrap();
    assert_ne!(first, second);

    assert_eq!(app.get("/profile", Some(&first)).await.status, StatusCode::FORBIDDEN);
    assert_eq!(app.get("/profile", Some(&second)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = common::TestApp::new().await;

    let response = app.delete("/sessions", Some("session_id=bogus")).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reset_token_for_unknown_email() {
    let app = common::TestApp::new().await;

    let response = app
        .post_form("/reset_password", &[("email", "ghost@example.com")])
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_password_with_bad_token() {
    let app = common::TestApp::new().await;
    app.login_as(EMAIL, PASSWORD).await;

    let response = app
        .put_form(
            "/reset_password",
            &[
                ("email", EMAIL),
                ("reset_token", "not-a-token"),
                ("new_password", NEW_PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.json()["error"]["message"], "Invalid reset token");
}

#[tokio::test]
async fn test_reset_token_is_single_use() {
    let app = common::TestApp::new().await;
    app.login_as(EMAIL, PASSWORD).await;

    let response = app
        .post_form("/reset_password", &[("email", EMAIL)])
        .await;
    let reset_token = response.json()["reset_token"].as_str().unwrap().to_string();

    let form = [
        ("email", EMAIL),
        ("reset_token", reset_token.as_str()),
        ("new_password", NEW_PASSWORD),
    ];
    assert_eq!(app.put_form("/reset_password", &form).await.status, StatusCode::OK);
    assert_eq!(
        app.put_form("/reset_password", &form).await.status,
        StatusCode::FORBIDDEN
    );
}

#[tokio::test]
async fn test_newer_reset_token_supersedes_older() {
    let app = common::TestApp::new().await;
    app.login_as(EMAIL, PASSWORD).await;

    let first = app
        .post_form("/reset_password", &[("email", EMAIL)])
        .await
        .json()["reset_token"]
        .as_str()
        .unwrap()
        .to_string();
    let second = app
        .post_form("/reset_password", &[("email", EMAIL)])
        .await
        .json()["reset_token"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(first, second);

    let stale = app
        .put_form(
            "/reset_password",
            &[("email", EMAIL), ("reset_token", &first), ("new_password", NEW_PASSWORD)],
        )
        .await;
    assert_eq!(stale.status, StatusCode::FORBIDDEN);

    let fresh = app
        .put_form(
            "/reset_password",
            &[("email", EMAIL), ("reset_token", &second), ("new_password", NEW_PASSWORD)],
        )
        .await;
    assert_eq!(fresh.status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_reset_keeps_session() {
    let app = common::TestApp::new().await;
    let cookie = app.login_as(EMAIL, PASSWORD).await;

    let reset_token = app
        .post_form("/reset_password", &[("email", EMAIL)])
        .await
        .json()["reset_token"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .put_form(
            "/reset_password",
            &[("email", EMAIL), ("reset_token", &reset_token), ("new_password", NEW_PASSWORD)],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    assert_eq!(app.get("/profile", Some(&cookie)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_password_reports_token_owner() {
    let app = common::TestApp::new().await;
    app.login_as(EMAIL, PASSWORD).await;
    app.login_as("other@example.com", PASSWORD).await;

    let reset_token = app
        .post_form("/reset_password", &[("email", EMAIL)])
        .await
        .json()["reset_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .put_form(
            "/reset_password",
            &[
                ("email", "other@example.com"),
                ("reset_token", &reset_token),
                ("new_password", NEW_PASSWORD),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["email"], EMAIL);

    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", NEW_PASSWORD)])
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_with_form_metacharacters() {
    let app = common::TestApp::new().await;
    let password = "a+b&c=d %e";

    let cookie = app.login_as(EMAIL, password).await;
    assert_eq!(app.get("/profile", Some(&cookie)).await.status, StatusCode::OK);

    let response = app
        .post_form("/sessions", &[("email", EMAIL), ("password", "a b&c=d %e")])
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
