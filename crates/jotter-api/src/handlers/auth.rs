//! `/auth` handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::auth::cookie::{clear_session_cookie, session_cookie};
use crate::auth::RequireUser;
use crate::error::ApiError;
use crate::services::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    state.auth.register(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Account created successfully" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let outcome = state.auth.login(req).await?;
    let max_age = state.auth.sessions().ttl().num_seconds();
    let cookie = session_cookie(&outcome.token, max_age, state.cookie_secure)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "message": "Login successful",
            "user": outcome.user,
        })),
    ))
}

/// Clears the cookie only. Issued tokens stay valid until they expire.
pub async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cookie = clear_session_cookie(state.cookie_secure)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "message": "Logged out successfully" })),
    ))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: RequireUser,
    payload: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    state.auth.change_password(user.id(), req).await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}
