//! Input validation functions
//!
//! Checks applied to credentials before they reach the store.
//! Email syntax is delegated to the `validator` crate.

use validator::ValidateEmail;

/// Maximum email length accepted by the `users.email` column
pub const MAX_EMAIL_LEN: usize = 250;

/// Maximum password length in bytes
pub const MAX_PASSWORD_LEN: usize = 128;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("Email too long".to_string());
    }
    if !email.validate_email() {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate a password before hashing
///
/// No strength policy is enforced; only emptiness and an upper bound
/// that keeps hashing cost predictable.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err("Password too long".to_string());
    }
    Ok(())
}
