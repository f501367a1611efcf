//! Opaque identifiers for sessions and password resets

use uuid::Uuid;

/// Generate a new unguessable identifier
///
/// UUIDv4 draws its 122 random bits from the OS CSPRNG.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
