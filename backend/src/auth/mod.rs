//! Authentication module
//!
//! Provides cookie-based sessions with argon2 (or bcrypt) password hashing.

mod password;
mod session;
mod token;

pub use password::{CredentialHasher, HashScheme, BCRYPT_MAX_PASSWORD_LEN};
pub use session::{removal_cookie, session_cookie, SessionUser};
pub use token::new_id;
