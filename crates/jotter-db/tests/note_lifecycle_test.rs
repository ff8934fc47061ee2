//! Note lifecycle against a real PostgreSQL database.
//!
//! **IMPORTANT**: These tests require a reachable PostgreSQL database.
//! Set `DATABASE_URL` and run with `cargo test -p jotter-db -- --ignored`.

use jotter_db::test_fixtures::{connect_test_database, new_note, unique_new_user};
use jotter_db::{NoteRepository, NotePatch, NoteState, RelationKind, RelationRepository, UserRepository};

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable PostgreSQL
async fn test_trash_recover_keeps_fields() {
    let db = connect_test_database().await.expect("Failed to connect");
    let owner = db.users.create(unique_new_user("life")).await.expect("user");

    let note = db
        .notes
        .insert(new_note(owner.id, "A", "B"))
        .await
        .expect("insert");

    assert!(db.notes.soft_delete(note.id, owner.id).await.expect("trash"));
    assert!(db.notes.fetch_view(note.id, owner.id).await.expect("view").is_none());

    let trash = db.notes.list(owner.id, NoteState::Trashed).await.expect("trash list");
    assert!(trash.iter().any(|n| n.id == note.id));

    assert!(db.notes.restore(note.id, owner.id).await.expect("restore"));
    let restored = db.notes.fetch(note.id).await.expect("fetch").expect("exists");
    assert_eq!(restored.entry_title, note.entry_title);
    assert_eq!(restored.content, note.content);
    assert_eq!(restored.created_at, note.created_at);
    assert!(!restored.is_deleted);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable PostgreSQL
async fn test_foreign_owner_cannot_mutate() {
    let db = connect_test_database().await.expect("Failed to connect");
    let owner = db.users.create(unique_new_user("own")).await.expect("user");
    let other = db.users.create(unique_new_user("oth")).await.expect("user");
    let note = db
        .notes
        .insert(new_note(owner.id, "mine", "body"))
        .await
        .expect("insert");

    let patch = NotePatch {
        entry_title: Some("stolen".to_string()),
        ..Default::default()
    };
    assert!(db.notes.update(note.id, other.id, patch).await.expect("update").is_none());
    assert!(!db.notes.soft_delete(note.id, other.id).await.expect("trash"));

    // Any authenticated user can still read an active note.
    let view = db.notes.fetch_view(note.id, other.id).await.expect("view");
    assert_eq!(view.expect("visible").entry_title, "mine");
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable PostgreSQL
async fn test_purge_requires_trash_and_cascades() {
    let db = connect_test_database().await.expect("Failed to connect");
    let owner = db.users.create(unique_new_user("purge")).await.expect("user");
    let note = db
        .notes
        .insert(new_note(owner.id, "gone", "soon"))
        .await
        .expect("insert");

    assert!(db
        .relations
        .toggle(RelationKind::Pin, owner.id, note.id)
        .await
        .expect("pin"));
    assert!(!db.notes.hard_delete(note.id, owner.id).await.expect("purge active"));

    db.notes.soft_delete(note.id, owner.id).await.expect("trash");
    assert!(db.notes.hard_delete(note.id, owner.id).await.expect("purge"));
    assert!(db.notes.fetch(note.id).await.expect("fetch").is_none());
    let pins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entry_pin WHERE entry_id = $1")
        .bind(note.id)
        .fetch_one(&db.pool)
        .await
        .expect("count");
    assert_eq!(pins, 0);
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with a reachable PostgreSQL
async fn test_update_keeps_fields_that_are_not_provided() {
    let db = connect_test_database().await.expect("Failed to connect");
    let owner = db.users.create(unique_new_user("syn")).await.expect("user");
    let mut req = new_note(owner.id, "t", "c");
    req.synopsis = Some("summary".to_string());
    let note = db.notes.insert(req).await.expect("insert");

    let patch = NotePatch {
        content: Some(String::new()),
        ..Default::default()
    };
    let updated = db
        .notes
        .update(note.id, owner.id, patch)
        .await
        .expect("update")
        .expect("owned");
    assert_eq!(updated.synopsis.as_deref(), Some("summary"));
    assert_eq!(updated.content, "");
    assert_eq!(updated.entry_title, "t");
    assert!(updated.last_updated >= note.last_updated);
}
