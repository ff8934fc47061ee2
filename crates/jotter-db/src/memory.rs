//! In-memory store for tests and database-less runs.
//!
//! Implements all three repository traits over one mutex-guarded state, so
//! every trait call is atomic the same way a single SQL statement is. Unique
//! constraints and the relation cascade on purge are reproduced.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use jotter_db::MemoryStore;
//!
//! let store = Arc::new(MemoryStore::new());
//! // Hand the same Arc to every service as users, notes and relations.
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use jotter_core::defaults::{EMAIL_TAKEN_MESSAGE, NOTE_NOT_FOUND_MESSAGE, USERNAME_TAKEN_MESSAGE};
use jotter_core::{
    new_v7, Error, NewNote, NewUser, Note, NotePatch, NoteRepository, NoteState, NoteView,
    ProfilePatch, RelationKind, RelationRecord, RelationRepository, Result, User, UserRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    notes: HashMap<Uuid, Note>,
    pins: Vec<RelationRecord>,
    bookmarks: Vec<RelationRecord>,
}

impl State {
    fn relation(&self, kind: RelationKind) -> &Vec<RelationRecord> {
        match kind {
            RelationKind::Pin => &self.pins,
            RelationKind::Bookmark => &self.bookmarks,
        }
    }

    fn relation_mut(&mut self, kind: RelationKind) -> &mut Vec<RelationRecord> {
        match kind {
            RelationKind::Pin => &mut self.pins,
            RelationKind::Bookmark => &mut self.bookmarks,
        }
    }

    fn has_relation(&self, kind: RelationKind, user_id: Uuid, note_id: Uuid) -> bool {
        self.relation(kind)
            .iter()
            .any(|r| r.user_id == user_id && r.note_id == note_id)
    }

    /// Username / email uniqueness across every account, deleted ones included.
    fn check_unique(&self, username: &str, email: &str, except: Option<Uuid>) -> Result<()> {
        let others = self.users.values().filter(|u| Some(u.id) != except);
        for user in others {
            if user.email_address == email {
                return Err(Error::Conflict(EMAIL_TAKEN_MESSAGE.to_string()));
            }
            if user.username == username {
                return Err(Error::Conflict(USERNAME_TAKEN_MESSAGE.to_string()));
            }
        }
        Ok(())
    }

    /// Project a note for `viewer`. Mirrors the inner join on the author.
    fn view(&self, note: &Note, viewer: Uuid) -> Option<NoteView> {
        let author = self.users.get(&note.owner_id)?;
        Some(NoteView {
            id: note.id,
            entry_title: note.entry_title.clone(),
            synopsis: note.synopsis.clone(),
            content: note.content.clone(),
            user_id: note.owner_id,
            author_first_name: author.first_name.clone(),
            author_last_name: author.last_name.clone(),
            created_at: note.created_at,
            updated_at: note.last_updated,
            pinned: self.has_relation(RelationKind::Pin, viewer, note.id),
            bookmarked: self.has_relation(RelationKind::Bookmark, viewer, note.id),
        })
    }

    fn owned_in_state(&self, id: Uuid, owner: Uuid, state: NoteState) -> bool {
        self.notes
            .get(&id)
            .map(|n| n.owner_id == owner && n.state() == state)
            .unwrap_or(false)
    }
}

/// Mutex-guarded in-memory implementation of every jotter store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("memory store lock poisoned".to_string()))
    }

    /// Number of stored accounts, deleted ones included.
    pub fn user_count(&self) -> Result<usize> {
        Ok(self.lock()?.users.len())
    }

    /// Number of association rows of `kind`, across all users.
    pub fn relation_count(&self, kind: RelationKind) -> Result<usize> {
        Ok(self.lock()?.relation(kind).len())
    }

    /// Stored password hash for a user, for assertions in tests.
    pub fn password_hash(&self, id: Uuid) -> Result<Option<String>> {
        Ok(self.lock()?.users.get(&id).map(|u| u.password_hash.clone()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|u| {
                !u.is_deleted && (u.username == identifier || u.email_address == identifier)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let state = self.lock()?;
        Ok(state.users.get(&id).filter(|u| !u.is_deleted).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let state = self.lock()?;
        Ok(state.users.values().any(|u| u.username == username))
    }

    async fn email_exists(&self, email_address: &str) -> Result<bool> {
        let state = self.lock()?;
        Ok(state.users.values().any(|u| u.email_address == email_address))
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let mut state = self.lock()?;
        state.check_unique(&user.username, &user.email_address, None)?;

        let now = Utc::now();
        let created = User {
            id: new_v7(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email_address: user.email_address,
            password_hash: user.password_hash,
            avatar: user.avatar,
            date_joined: now,
            last_update: now,
            is_deleted: false,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut state = self.lock()?;
        match state.users.get_mut(&id).filter(|u| !u.is_deleted) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.last_update = Utc::now();
                Ok(())
            }
            None => Err(Error::NotFound(format!("User {} not found", id))),
        }
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<User>> {
        let mut state = self.lock()?;
        let current = match state.users.get(&id).filter(|u| !u.is_deleted) {
            Some(user) => user.clone(),
            None => return Ok(None),
        };

        let username = patch.username.unwrap_or(current.username.clone());
        let email = patch.email_address.unwrap_or(current.email_address.clone());
        state.check_unique(&username, &email, Some(id))?;

        let mut updated = current;
        if let Some(first_name) = patch.first_name {
            updated.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            updated.last_name = last_name;
        }
        if let Some(avatar) = patch.avatar {
            updated.avatar = avatar;
        }
        updated.username = username;
        updated.email_address = email;
        updated.last_update = Utc::now();

        state.users.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn mark_deleted(&self, id: Uuid) -> Result<bool> {
        let mut state = self.lock()?;
        match state.users.get_mut(&id).filter(|u| !u.is_deleted) {
            Some(user) => {
                user.is_deleted = true;
                user.last_update = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl NoteRepository for MemoryStore {
    async fn insert(&self, note: NewNote) -> Result<Note> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let created = Note {
            id: new_v7(),
            entry_title: note.entry_title,
            synopsis: note.synopsis,
            content: note.content,
            owner_id: note.owner_id,
            created_at: now,
            last_updated: now,
            is_deleted: false,
        };
        state.notes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.lock()?.notes.get(&id).cloned())
    }

    async fn fetch_view(&self, id: Uuid, viewer: Uuid) -> Result<Option<NoteView>> {
        let state = self.lock()?;
        Ok(state
            .notes
            .get(&id)
            .filter(|n| !n.is_deleted)
            .and_then(|n| state.view(n, viewer)))
    }

    async fn list(&self, owner: Uuid, note_state: NoteState) -> Result<Vec<NoteView>> {
        let state = self.lock()?;
        let mut notes: Vec<&Note> = state
            .notes
            .values()
            .filter(|n| n.owner_id == owner && n.state() == note_state)
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notes
            .into_iter()
            .filter_map(|n| state.view(n, owner))
            .collect())
    }

    async fn update(&self, id: Uuid, owner: Uuid, patch: NotePatch) -> Result<Option<Note>> {
        let mut state = self.lock()?;
        match state
            .notes
            .get_mut(&id)
            .filter(|n| n.owner_id == owner && !n.is_deleted)
        {
            Some(note) => {
                patch.apply(note);
                note.last_updated = Utc::now();
                Ok(Some(note.clone()))
            }
            None => Ok(None),
        }
    }

    async fn soft_delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.owned_in_state(id, owner, NoteState::Active) {
            return Ok(false);
        }
        if let Some(note) = state.notes.get_mut(&id) {
            note.is_deleted = true;
        }
        Ok(true)
    }

    async fn restore(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.owned_in_state(id, owner, NoteState::Trashed) {
            return Ok(false);
        }
        if let Some(note) = state.notes.get_mut(&id) {
            note.is_deleted = false;
        }
        Ok(true)
    }

    async fn hard_delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.owned_in_state(id, owner, NoteState::Trashed) {
            return Ok(false);
        }
        state.notes.remove(&id);
        state.pins.retain(|r| r.note_id != id);
        state.bookmarks.retain(|r| r.note_id != id);
        Ok(true)
    }
}

#[async_trait]
impl RelationRepository for MemoryStore {
    async fn toggle(&self, kind: RelationKind, user_id: Uuid, note_id: Uuid) -> Result<bool> {
        let mut state = self.lock()?;
        let visible = state
            .notes
            .get(&note_id)
            .map(|n| !n.is_deleted)
            .unwrap_or(false);
        if !visible {
            return Err(Error::NotFound(NOTE_NOT_FOUND_MESSAGE.to_string()));
        }

        let rows = state.relation_mut(kind);
        let before = rows.len();
        rows.retain(|r| !(r.user_id == user_id && r.note_id == note_id));
        if rows.len() < before {
            return Ok(false);
        }
        rows.push(RelationRecord {
            id: new_v7(),
            user_id,
            note_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_notes(&self, kind: RelationKind, user_id: Uuid) -> Result<Vec<NoteView>> {
        let state = self.lock()?;
        let mut rows: Vec<&RelationRecord> = state
            .relation(kind)
            .iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows
            .into_iter()
            .filter_map(|r| state.notes.get(&r.note_id))
            .filter(|n| !n.is_deleted)
            .filter_map(|n| state.view(n, user_id))
            .collect())
    }
}
