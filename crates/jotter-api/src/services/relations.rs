//! Pin and bookmark toggles.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use jotter_core::defaults::NOTE_NOT_FOUND_MESSAGE;
use jotter_core::{Error, NoteRepository, NoteView, RelationKind, RelationRepository, Result};

/// Which notes a user may pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinScope {
    /// Any active note.
    #[default]
    Any,
    /// Only notes the caller owns.
    Owner,
}

impl FromStr for PinScope {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(PinScope::Any),
            "owner" => Ok(PinScope::Owner),
            other => Err(format!("expected \"any\" or \"owner\", got {:?}", other)),
        }
    }
}

impl fmt::Display for PinScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinScope::Any => write!(f, "any"),
            PinScope::Owner => write!(f, "owner"),
        }
    }
}

pub struct RelationService {
    notes: Arc<dyn NoteRepository>,
    relations: Arc<dyn RelationRepository>,
    pin_scope: PinScope,
}

impl RelationService {
    pub fn new(
        notes: Arc<dyn NoteRepository>,
        relations: Arc<dyn RelationRepository>,
        pin_scope: PinScope,
    ) -> Self {
        Self {
            notes,
            relations,
            pin_scope,
        }
    }

    /// Flip the caller's association with a note. Returns the new state.
    ///
    /// The store re-checks that the note is active inside the toggle itself,
    /// so a note trashed between the lookup and the write is still refused.
    pub async fn toggle(&self, kind: RelationKind, user_id: Uuid, note_id: Uuid) -> Result<bool> {
        let note = self
            .notes
            .fetch(note_id)
            .await?
            .filter(|n| !n.is_deleted)
            .ok_or_else(not_found)?;

        if kind == RelationKind::Pin
            && self.pin_scope == PinScope::Owner
            && note.owner_id != user_id
        {
            return Err(not_found());
        }

        let now_on = self.relations.toggle(kind, user_id, note_id).await?;

        info!(
            subsystem = "api",
            component = "relations",
            op = "toggle",
            relation = %kind,
            user_id = %user_id,
            note_id = %note_id,
            now_on,
            "Relation toggled"
        );
        Ok(now_on)
    }

    /// Active notes the caller has associated, most recent association first.
    pub async fn list(&self, kind: RelationKind, user_id: Uuid) -> Result<Vec<NoteView>> {
        self.relations.list_notes(kind, user_id).await
    }
}

fn not_found() -> Error {
    Error::NotFound(NOTE_NOT_FOUND_MESSAGE.to_string())
}
