//! ID generation utilities.

use uuid::Uuid;

/// Generates a new principal identifier.
///
/// Identifiers are UUID v7 strings, so they sort by creation time.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}
