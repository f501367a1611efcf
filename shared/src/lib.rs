//! Session Auth Shared Library
//!
//! Transport types, input validation and log redaction shared by the
//! backend and its tests.

pub mod redaction;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use redaction::{filter_datum, PatternError, Redactor};
pub use types::*;
