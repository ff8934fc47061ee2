//! HTTP handlers for jotter-api.

pub mod auth;
pub mod notes;
pub mod users;

use axum::{response::IntoResponse, Json};

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
