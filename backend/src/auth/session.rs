//! Session cookie handling
//!
//! Provides the [`SessionUser`] extractor, which resolves the session
//! cookie to a stored user, plus the cookies issued on login and logout.

use crate::config::SessionConfig;
use crate::error::ApiError;
use crate::repositories::UserRecord;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{extract::FromRef, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// User resolved from the session cookie
///
/// Rejects with 403 when the cookie is missing or names no live session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: UserRecord,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for SessionUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = jar
            .get(&app_state.config().session.cookie_name)
            .map(|cookie| cookie.value().to_string());

        let user = AuthService::get_user_from_session(app_state.db(), session_id.as_deref())
            .await?
            .ok_or_else(|| ApiError::Forbidden("Invalid or missing session".to_string()))?;

        Ok(SessionUser { user })
    }
}

/// Cookie carrying a freshly issued session id
pub fn session_cookie(config: &SessionConfig, session_id: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookie)
        .build()
}

/// Cookie that clears the session id in the browser
pub fn removal_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), String::new()))
        .path("/")
        .build()
}
