//! Note lifecycle: create, read, update, trash, recover, purge.
//!
//! Ownership and lifecycle state are part of every store condition. A note
//! that is missing, owned by someone else, or in the wrong state is reported
//! the same way, as `NotFound`.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use jotter_core::defaults::{NOTE_NOT_FOUND_MESSAGE, NOTE_NOT_IN_TRASH_MESSAGE};
use jotter_core::{
    Error, NewNote, Note, NotePatch, NoteRepository, NoteState, NoteView, Result,
};

use super::non_blank;

/// Body of `POST /notes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub entry_title: Option<String>,
    pub synopsis: Option<String>,
    pub content: Option<String>,
}

/// Body of `PATCH /notes/:id`.
///
/// Absent and `null` fields keep their stored value. Present strings,
/// empty ones included, are written as given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub entry_title: Option<String>,
    pub synopsis: Option<String>,
    pub content: Option<String>,
}

impl From<UpdateNoteRequest> for NotePatch {
    fn from(req: UpdateNoteRequest) -> Self {
        NotePatch {
            entry_title: req.entry_title,
            synopsis: req.synopsis,
            content: req.content,
        }
    }
}

pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteRepository>) -> Self {
        Self { notes }
    }

    pub async fn create(&self, owner: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let entry_title = non_blank(req.entry_title.as_deref())
            .ok_or_else(|| Error::InvalidInput("Note Title is required".to_string()))?
            .to_string();
        let content = non_blank(req.content.as_deref())
            .ok_or_else(|| Error::InvalidInput("Content is required".to_string()))?
            .to_string();
        let synopsis = req.synopsis.filter(|s| !s.trim().is_empty());

        let note = self
            .notes
            .insert(NewNote {
                owner_id: owner,
                entry_title,
                synopsis,
                content,
            })
            .await?;

        info!(
            subsystem = "api",
            component = "notes",
            op = "create",
            user_id = %owner,
            note_id = %note.id,
            "Note created"
        );
        Ok(note)
    }

    /// Any authenticated user may read an active note.
    pub async fn get(&self, viewer: Uuid, id: Uuid) -> Result<NoteView> {
        self.notes
            .fetch_view(id, viewer)
            .await?
            .ok_or_else(not_found)
    }

    /// The caller's active notes, newest first.
    pub async fn list(&self, owner: Uuid) -> Result<Vec<NoteView>> {
        self.notes.list(owner, NoteState::Active).await
    }

    /// The caller's trashed notes, newest first.
    pub async fn list_trash(&self, owner: Uuid) -> Result<Vec<NoteView>> {
        self.notes.list(owner, NoteState::Trashed).await
    }

    pub async fn update(&self, owner: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let note = self
            .notes
            .update(id, owner, NotePatch::from(req))
            .await?
            .ok_or_else(not_found)?;

        info!(
            subsystem = "api",
            component = "notes",
            op = "update",
            user_id = %owner,
            note_id = %id,
            "Note updated"
        );
        Ok(note)
    }

    pub async fn trash(&self, owner: Uuid, id: Uuid) -> Result<()> {
        if !self.notes.soft_delete(id, owner).await? {
            return Err(not_found());
        }
        info!(
            subsystem = "api",
            component = "notes",
            op = "trash",
            user_id = %owner,
            note_id = %id,
            "Note moved to trash"
        );
        Ok(())
    }

    pub async fn recover(&self, owner: Uuid, id: Uuid) -> Result<()> {
        if !self.notes.restore(id, owner).await? {
            return Err(not_found());
        }
        info!(
            subsystem = "api",
            component = "notes",
            op = "recover",
            user_id = %owner,
            note_id = %id,
            "Note recovered"
        );
        Ok(())
    }

    /// Permanently delete a trashed note. Active notes cannot be purged.
    pub async fn purge(&self, owner: Uuid, id: Uuid) -> Result<()> {
        if !self.notes.hard_delete(id, owner).await? {
            return Err(Error::NotFound(NOTE_NOT_IN_TRASH_MESSAGE.to_string()));
        }
        info!(
            subsystem = "api",
            component = "notes",
            op = "purge",
            user_id = %owner,
            note_id = %id,
            "Note permanently deleted"
        );
        Ok(())
    }
}

fn not_found() -> Error {
    Error::NotFound(NOTE_NOT_FOUND_MESSAGE.to_string())
}
