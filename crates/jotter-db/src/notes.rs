//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use jotter_core::{
    new_v7, Error, NewNote, Note, NotePatch, NoteRepository, NoteState, NoteView, Result,
};

const NOTE_COLUMNS: &str =
    "id, entry_title, synopsis, content, user_id, created_at, last_updated, is_deleted";

/// Projection shared by every query returning a `NoteView`.
///
/// `$1` is always the viewer; pinned / bookmarked reflect the viewer's own
/// associations, the author name comes from the note owner.
pub(crate) const NOTE_VIEW_SELECT: &str = "SELECT e.id, e.entry_title, e.synopsis, e.content, \
       e.user_id, u.first_name AS author_first_name, u.last_name AS author_last_name, \
       e.created_at, e.last_updated AS updated_at, \
       EXISTS(SELECT 1 FROM entry_pin p WHERE p.entry_id = e.id AND p.user_id = $1) AS pinned, \
       EXISTS(SELECT 1 FROM entry_bookmark b WHERE b.entry_id = e.id AND b.user_id = $1) AS bookmarked \
     FROM entry e \
     JOIN app_user u ON u.id = e.user_id";

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Flip `is_deleted` from `from` to its opposite on an owned note.
    async fn transition(&self, id: Uuid, owner: Uuid, from: NoteState) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE entry SET is_deleted = NOT is_deleted \
             WHERE id = $1 AND user_id = $2 AND is_deleted = $3",
        )
        .bind(id)
        .bind(owner)
        .bind(from.is_deleted())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, note: NewNote) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO entry (id, entry_title, synopsis, content, user_id, created_at, \
             last_updated, is_deleted) \
             VALUES ($1, $2, $3, $4, $5, $6, $6, FALSE) \
             RETURNING {}",
            NOTE_COLUMNS
        );
        let created = sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .bind(&note.entry_title)
            .bind(&note.synopsis)
            .bind(&note.content)
            .bind(note.owner_id)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "notes",
            op = "insert",
            note_id = %created.id,
            user_id = %created.owner_id,
            "Note inserted"
        );
        Ok(created)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Note>> {
        let sql = format!("SELECT {} FROM entry WHERE id = $1", NOTE_COLUMNS);
        sqlx::query_as::<_, Note>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn fetch_view(&self, id: Uuid, viewer: Uuid) -> Result<Option<NoteView>> {
        let sql = format!(
            "{} WHERE e.id = $2 AND e.is_deleted = FALSE",
            NOTE_VIEW_SELECT
        );
        sqlx::query_as::<_, NoteView>(&sql)
            .bind(viewer)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn list(&self, owner: Uuid, state: NoteState) -> Result<Vec<NoteView>> {
        let sql = format!(
            "{} WHERE e.user_id = $1 AND e.is_deleted = $2 ORDER BY e.created_at DESC, e.id DESC",
            NOTE_VIEW_SELECT
        );
        sqlx::query_as::<_, NoteView>(&sql)
            .bind(owner)
            .bind(state.is_deleted())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn update(&self, id: Uuid, owner: Uuid, patch: NotePatch) -> Result<Option<Note>> {
        let sql = format!(
            "UPDATE entry SET \
               entry_title = COALESCE($1, entry_title), \
               content = COALESCE($2, content), \
               synopsis = COALESCE($3, synopsis), \
               last_updated = $4 \
             WHERE id = $5 AND user_id = $6 AND is_deleted = FALSE \
             RETURNING {}",
            NOTE_COLUMNS
        );
        sqlx::query_as::<_, Note>(&sql)
            .bind(patch.entry_title)
            .bind(patch.content)
            .bind(patch.synopsis)
            .bind(Utc::now())
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn soft_delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.transition(id, owner, NoteState::Active).await
    }

    async fn restore(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.transition(id, owner, NoteState::Trashed).await
    }

    async fn hard_delete(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        // entry_pin / entry_bookmark rows go with it via ON DELETE CASCADE.
        let result = sqlx::query(
            "DELETE FROM entry WHERE id = $1 AND user_id = $2 AND is_deleted = TRUE",
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
