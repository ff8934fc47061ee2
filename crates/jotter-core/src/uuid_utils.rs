//! UUID helpers.
//!
//! All jotter identifiers are UUIDv7, which embed a millisecond timestamp in
//! their leading 48 bits and therefore sort by creation time.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Generate a new UUIDv7 identifier.
///
/// # Example
///
/// ```
/// use jotter_core::uuid_utils::new_v7;
///
/// let id = new_v7();
/// assert_eq!(id.get_version_num(), 7);
/// ```
#[inline]
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

/// Parse a note id taken from a request path.
///
/// Any string that is not a UUID is rejected with `Error::InvalidInput`
/// carrying the client-facing message "Invalid note ID".
pub fn parse_id(raw: &str) -> Result<Uuid> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Invalid note ID".to_string()));
    }
    Uuid::parse_str(trimmed).map_err(|_| Error::InvalidInput("Invalid note ID".to_string()))
}
