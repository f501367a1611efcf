//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the credential hasher.

pub mod auth;

pub use auth::AuthService;
