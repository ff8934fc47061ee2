//! `/users` handlers. All operate on the caller's own account.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::auth::cookie::clear_session_cookie;
use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::services::UpdateProfileRequest;
use crate::state::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.profiles.get(user.id()).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: RequireUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let profile = state.profiles.update(user.id(), req).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "profile": profile,
    })))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    user: RequireUser,
) -> Result<impl IntoResponse, ApiError> {
    state.profiles.delete(user.id()).await?;
    let cookie = clear_session_cookie(state.cookie_secure)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Account deleted successfully" })),
    ))
}
