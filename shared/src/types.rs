//! API request and response types
//!
//! Requests arrive as urlencoded forms; responses are JSON bodies.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Email and password, used by registration and login
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: SecretString,
}

/// Password reset request
#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordForm {
    pub email: String,
}

/// Password update authorised by a reset token
#[derive(Debug, Deserialize)]
pub struct UpdatePasswordForm {
    pub email: String,
    pub reset_token: String,
    pub new_password: SecretString,
}

/// Generic `{email, message}` acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessageResponse {
    pub email: String,
    pub message: String,
}

impl EmailMessageResponse {
    pub fn new(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Profile of the logged-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub email: String,
}

/// Freshly issued reset token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

/// Landing page body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
