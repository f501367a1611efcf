//! Authentication routes
//!
//! Registration, login and logout. The session id travels in an
//! `HttpOnly` cookie set on login and removed on logout.

use crate::auth::{removal_cookie, session_cookie, SessionUser};
use crate::error::{ApiError, ApiResult};
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use secrecy::ExposeSecret;
use session_auth_shared::types::{CredentialsForm, EmailMessageResponse};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/sessions", post(login).delete(logout))
}

/// Register a new user
///
/// POST /users
///
/// 400 when the email is already registered.
async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Json<EmailMessageResponse>> {
    let user = AuthService::register(
        state.db(),
        state.hasher(),
        &form.email,
        form.password.expose_secret(),
    )
    .await?;

    Ok(Json(EmailMessageResponse::new(user.email, "user created")))
}

/// Log in and receive a session cookie
///
/// POST /sessions
///
/// 401 on a wrong password or unknown email.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<(CookieJar, Json<EmailMessageResponse>)> {
    let valid =
        AuthService::valid_login(state.db(), &form.email, form.password.expose_secret()).await?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let session_id = AuthService::create_session(state.db(), &form.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let jar = jar.add(session_cookie(&state.config().session, session_id));
    Ok((jar, Json(EmailMessageResponse::new(form.email, "logged in"))))
}

/// Log out and go back to the landing page
///
/// DELETE /sessions
///
/// 403 when the session cookie is missing or stale.
async fn logout(
    State(state): State<AppState>,
    session: SessionUser,
    jar: CookieJar,
) -> ApiResult<Response> {
    AuthService::destroy_session(state.db(), session.user.id).await?;

    let jar = jar.remove(removal_cookie(&state.config().session));
    Ok((StatusCode::FOUND, jar, [(header::LOCATION, "/")]).into_response())
}
