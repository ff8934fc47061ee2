//! Core traits for jotter's persistence seams.
//!
//! These traits define the interfaces that concrete stores must satisfy.
//! Services receive them as `Arc<dyn ...>` so tests can swap in the
//! in-memory implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CREDENTIAL STORE
// =============================================================================

/// Repository for user accounts. Deleted accounts are invisible to lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user whose username or email address exactly equals `identifier`.
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>>;

    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Check whether a username is taken (deleted accounts included).
    async fn username_exists(&self, username: &str) -> Result<bool>;

    /// Check whether an email address is taken (deleted accounts included).
    async fn email_exists(&self, email_address: &str) -> Result<bool>;

    /// Create a user. Fails with `Error::Conflict` on a duplicate username or
    /// email address.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Replace the stored password hash.
    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()>;

    /// Patch profile fields. Returns `None` when the user does not exist.
    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<User>>;

    /// Soft-delete a user. Returns false when there was nothing to delete.
    async fn mark_deleted(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// NOTE STORE
// =============================================================================

/// Repository for notes.
///
/// Every mutating method takes the acting owner and the required lifecycle
/// state as part of its condition, so the check and the write happen in one
/// store operation. A `false` / `None` result means "not found, not yours,
/// or wrong state".
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new active note.
    async fn insert(&self, note: NewNote) -> Result<Note>;

    /// Fetch a raw note by id, in any state.
    async fn fetch(&self, id: Uuid) -> Result<Option<Note>>;

    /// Fetch an active note as seen by `viewer`.
    async fn fetch_view(&self, id: Uuid, viewer: Uuid) -> Result<Option<NoteView>>;

    /// List the owner's notes in `state`, newest first.
    async fn list(&self, owner: Uuid, state: NoteState) -> Result<Vec<NoteView>>;

    /// Patch an active note owned by `owner`.
    async fn update(&self, id: Uuid, owner: Uuid, patch: NotePatch) -> Result<Option<Note>>;

    /// Move an active owned note to the trash.
    async fn soft_delete(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    /// Restore a trashed owned note.
    async fn restore(&self, id: Uuid, owner: Uuid) -> Result<bool>;

    /// Permanently delete a trashed owned note (and its relations).
    async fn hard_delete(&self, id: Uuid, owner: Uuid) -> Result<bool>;
}

// =============================================================================
// RELATIONSHIP STORE
// =============================================================================

/// Repository for per-user pin and bookmark associations.
#[async_trait]
pub trait RelationRepository: Send + Sync {
    /// Atomically remove the (user, note) association if present, otherwise
    /// create it. The create half only succeeds while the note is active.
    ///
    /// Returns the resulting state (`true` = associated).
    async fn toggle(&self, kind: RelationKind, user_id: Uuid, note_id: Uuid) -> Result<bool>;

    /// List the user's associated active notes, most recently associated
    /// first.
    async fn list_notes(&self, kind: RelationKind, user_id: Uuid) -> Result<Vec<NoteView>>;
}
