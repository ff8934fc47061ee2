//! Pin and bookmark repository implementation.
//!
//! Both relations share one code path; `RelationKind::table` selects the
//! backing table. Table names come from a closed enum, never from input.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use jotter_core::defaults::NOTE_NOT_FOUND_MESSAGE;
use jotter_core::{new_v7, Error, NoteView, RelationKind, RelationRepository, Result};

use crate::notes::NOTE_VIEW_SELECT;

/// PostgreSQL implementation of RelationRepository.
pub struct PgRelationRepository {
    pool: Pool<Postgres>,
}

impl PgRelationRepository {
    /// Create a new PgRelationRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Single-statement toggle.
///
/// `removed` deletes an existing pair; `inserted` only runs when nothing was
/// removed. A lost insert race hits `ON CONFLICT DO NOTHING`, which still
/// means the pair exists. Both halves are restricted to active notes.
fn toggle_sql(kind: RelationKind) -> String {
    let table = kind.table();
    format!(
        "WITH target AS ( \
           SELECT id FROM entry WHERE id = $2 AND is_deleted = FALSE \
         ), removed AS ( \
           DELETE FROM {table} \
           WHERE user_id = $1 AND entry_id IN (SELECT id FROM target) \
           RETURNING id \
         ), inserted AS ( \
           INSERT INTO {table} (id, user_id, entry_id, created_at) \
           SELECT $3, $1, t.id, $4 FROM target t \
           WHERE NOT EXISTS (SELECT 1 FROM removed) \
           ON CONFLICT (user_id, entry_id) DO NOTHING \
           RETURNING id \
         ) \
         SELECT EXISTS(SELECT 1 FROM target) AS visible, \
                EXISTS(SELECT 1 FROM removed) AS removed",
        table = table
    )
}

#[async_trait]
impl RelationRepository for PgRelationRepository {
    async fn toggle(&self, kind: RelationKind, user_id: Uuid, note_id: Uuid) -> Result<bool> {
        let row = sqlx::query(&toggle_sql(kind))
            .bind(user_id)
            .bind(note_id)
            .bind(new_v7())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let visible: bool = row.get("visible");
        let removed: bool = row.get("removed");
        if !visible {
            return Err(Error::NotFound(NOTE_NOT_FOUND_MESSAGE.to_string()));
        }
        let now_on = !removed;

        debug!(
            subsystem = "db",
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


    async fn list_notes(&self, kind: RelationKind, user_id: Uuid) -> Result<Vec<NoteView>> {
        let sql = format!(
            "{} JOIN {} r ON r.entry_id = e.id AND r.user_id = $1 \
             WHERE e.is_deleted = FALSE \
             ORDER BY r.created_at DESC, r.id DESC",
            NOTE_VIEW_SELECT,
            kind.table()
        );
        sqlx::query_as::<_, NoteView>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }
}
