//! `/notes` handlers.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use jotter_core::{parse_id, RelationKind};

use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::services::{CreateNoteRequest, UpdateNoteRequest};
use crate::state::AppState;

pub async fn create_note(
    State(state): State<AppState>,
    user: RequireUser,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let note = state.notes.create(user.id(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Note created successfully", "note": note })),
    ))
}

pub async fn list_notes(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.notes.list(user.id()).await?))
}

pub async fn list_trash(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.notes.list_trash(user.id()).await?))
}

pub async fn list_bookmarks(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .relations
            .list(RelationKind::Bookmark, user.id())
            .await?,
    ))
}

pub async fn list_pinned(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.relations.list(RelationKind::Pin, user.id()).await?))
}

pub async fn get_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.notes.get(user.id(), id).await?))
}

pub async fn update_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let Json(req) = payload?;
    let note = state.notes.update(user.id(), id, req).await?;
    Ok(Json(
        json!({ "message": "Note updated successfully", "note": note }),
    ))
}

pub async fn trash_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.notes.trash(user.id(), id).await?;
    Ok(Json(json!({ "message": "Note moved to trash" })))
}

pub async fn recover_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.notes.recover(user.id(), id).await?;
    Ok(Json(json!({ "message": "Note recovered successfully" })))
}

pub async fn purge_note(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    state.notes.purge(user.id(), id).await?;
    Ok(Json(json!({ "message": "Note permanently deleted" })))
}

pub async fn toggle_pin(
    state: State<AppState>,
    user: RequireUser,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    toggle(state, user, path, RelationKind::Pin).await
}

pub async fn toggle_bookmark(
    state: State<AppState>,
    user: RequireUser,
    path: Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    toggle(state, user, path, RelationKind::Bookmark).await
}

async fn toggle(
    State(state): State<AppState>,
    user: RequireUser,
    Path(id): Path<String>,
    kind: RelationKind,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&id)?;
    let now_on = state.relations.toggle(kind, user.id(), id).await?;

    let mut body = serde_json::Map::new();
    body.insert("message".to_string(), json!(kind.toggle_message(now_on)));
    body.insert(kind.field().to_string(), json!(now_on));
    Ok(Json(serde_json::Value::Object(body)))
}
