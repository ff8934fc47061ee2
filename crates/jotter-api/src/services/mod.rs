//! Service layer for business logic.
//!
//! Services own the rules (validation, ownership, lifecycle state) and talk
//! to storage only through the `jotter_core` repository traits.

pub mod auth;
pub mod notes;
pub mod profiles;
pub mod relations;

pub use auth::{AuthService, ChangePasswordRequest, LoginOutcome, LoginRequest, RegisterRequest};
pub use notes::{CreateNoteRequest, NoteService, UpdateNoteRequest};
pub use profiles::{ProfileService, UpdateProfileRequest};
pub use relations::{PinScope, RelationService};

/// Return the trimmed value when present and non-blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
