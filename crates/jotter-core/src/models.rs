//! Core data models for jotter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// USER TYPES
// =============================================================================

/// A stored user account, including its password hash.
///
/// Never serialized directly; use [`UserProfile`] or [`SessionUser`] for
/// anything that leaves the server.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email_address: String,
    pub password_hash: String,
    pub avatar: String,
    pub date_joined: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub is_deleted: bool,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email_address", &self.email_address)
            .field("password_hash", &"[REDACTED]")
            .field("is_deleted", &self.is_deleted)
            .finish()
    }
}

/// Fields required to create a user. The password is already hashed.
#[derive(Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email_address: String,
    pub password_hash: String,
    pub avatar: String,
}

/// Profile fields a user may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub avatar: Option<String>,
}

impl ProfilePatch {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email_address.is_none()
            && self.avatar.is_none()
    }
}

/// Public profile projection returned by `GET /users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email_address: String,
    pub date_joined: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub avatar: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email_address: user.email_address.clone(),
            date_joined: user.date_joined,
            last_update: user.last_update,
            avatar: user.avatar.clone(),
        }
    }
}

/// Identity carried inside a session token and returned on login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email_address: String,
    pub avatar: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email_address: user.email_address.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// Lifecycle state of a note. Purged notes no longer exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteState {
    Active,
    Trashed,
}

impl NoteState {
    /// Value of the `is_deleted` column for this state.
    pub fn is_deleted(self) -> bool {
        matches!(self, NoteState::Trashed)
    }

    pub fn from_deleted(is_deleted: bool) -> Self {
        if is_deleted {
            NoteState::Trashed
        } else {
            NoteState::Active
        }
    }
}

/// A stored note ("entry").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub entry_title: String,
    pub synopsis: Option<String>,
    pub content: String,
    #[serde(rename = "userId")]
    #[sqlx(rename = "user_id")]
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Note {
    pub fn state(&self) -> NoteState {
        NoteState::from_deleted(self.is_deleted)
    }
}

/// Fields required to create a note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: Uuid,
    pub entry_title: String,
    pub synopsis: Option<String>,
    pub content: String,
}

/// Partial note update. Only fields that are `Some` are written; `None`
/// keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub entry_title: Option<String>,
    pub synopsis: Option<String>,
    pub content: Option<String>,
}

impl NotePatch {
    pub fn is_empty(&self) -> bool {
        self.entry_title.is_none() && self.synopsis.is_none() && self.content.is_none()
    }

    /// Apply this patch to a note in place.
    pub fn apply(&self, note: &mut Note) {
        if let Some(title) = &self.entry_title {
            note.entry_title = title.clone();
        }
        if let Some(synopsis) = &self.synopsis {
            note.synopsis = Some(synopsis.clone());
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
    }
}

/// A note as seen by a particular caller: author name plus the caller's own
/// pin and bookmark status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: Uuid,
    pub entry_title: String,
    pub synopsis: Option<String>,
    pub content: String,
    pub user_id: Uuid,
    pub author_first_name: String,
    pub author_last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pinned: bool,
    pub bookmarked: bool,
}

// =============================================================================
// RELATION TYPES
// =============================================================================

/// The two per-user note relations. Both follow identical toggle semantics
/// against independent stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Pin,
    Bookmark,
}

impl RelationKind {
    /// Backing table for this relation.
    pub fn table(self) -> &'static str {
        match self {
            RelationKind::Pin => "entry_pin",
            RelationKind::Bookmark => "entry_bookmark",
        }
    }

    /// Field name used in toggle responses.
    pub fn field(self) -> &'static str {
        match self {
            RelationKind::Pin => "pinned",
            RelationKind::Bookmark => "bookmarked",
        }
    }

    /// User-facing message describing the state a toggle just produced.
    pub fn toggle_message(self, now_on: bool) -> &'static str {
        match (self, now_on) {
            (RelationKind::Pin, true) => "Note pinned successfully",
            (RelationKind::Pin, false) => "Note unpinned successfully",
            (RelationKind::Bookmark, true) => "Note bookmarked successfully",
            (RelationKind::Bookmark, false) => "Bookmark removed successfully",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Pin => write!(f, "pin"),
            RelationKind::Bookmark => write!(f, "bookmark"),
        }
    }
}

/// One pin or bookmark association row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RelationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "entry_id")]
    pub note_id: Uuid,
    pub created_at: DateTime<Utc>,
}
