//! User profile route

use crate::auth::SessionUser;
use crate::state::AppState;
use axum::{routing::get, Json, Router};
use session_auth_shared::types::ProfileResponse;

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

/// GET /profile - email of the logged-in user, 403 without a valid session
async fn get_profile(session: SessionUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        email: session.user.email,
    })
}
