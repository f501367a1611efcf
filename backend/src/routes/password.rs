//! Password reset routes
//!
//! `POST` issues a one-time reset token, `PUT` redeems it.

use crate::error::{ApiError, ApiResult};
use crate::services::AuthService;
use crate::state::AppState;
use axum::{extract::State, routing::post, Form, Json, Router};
use secrecy::ExposeSecret;
use session_auth_shared::types::{
    EmailMessageResponse, ResetPasswordForm, ResetTokenResponse, UpdatePasswordForm,
};

/// Create password reset routes
pub fn password_routes() -> Router<AppState> {
    Router::new().route(
        "/reset_password",
        post(get_reset_password_token).put(update_password),
    )
}

/// Issue a reset token
///
/// POST /reset_password
///
/// 403 when the email is not registered.
async fn get_reset_password_token(
    State(state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> ApiResult<Json<ResetTokenResponse>> {
    let reset_token = AuthService::get_reset_password_token(state.db(), &form.email)
        .await
        .map_err(|e| match ApiError::from(e) {
            ApiError::Forbidden(_) => ApiError::Forbidden("Email not registered".to_string()),
            other => other,
        })?;

    Ok(Json(ResetTokenResponse {
        email: form.email,
        reset_token,
    }))
}

/// Set a new password with a reset token
///
/// PUT /reset_password
///
/// 403 when the token is unknown or already used. The response names the
/// account the token belonged to.
async fn update_password(
    State(state): State<AppState>,
    Form(form): Form<UpdatePasswordForm>,
) -> ApiResult<Json<EmailMessageResponse>> {
    let user = AuthService::update_password(
        state.db(),
        state.hasher(),
        &form.reset_token,
        form.new_password.expose_secret(),
    )
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Forbidden(_) => ApiError::Forbidden("Invalid reset token".to_string()),
        other => other,
    })?;

    Ok(Json(EmailMessageResponse::new(user.email, "Password updated")))
}
