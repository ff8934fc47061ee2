//! # jotter-api
//!
//! HTTP API for jotter: accounts, session cookies, notes with a trash
//! lifecycle, and per-user pins and bookmarks.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod services;
pub mod state;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use state::{AppState, Stores};

use handlers::{auth as auth_handlers, notes, users};

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Parse configured origins into header values, skipping invalid ones.
fn cors_origins(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

/// Build the full router with middleware.
pub fn build_router(state: AppState, config: &ApiConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Auth
        .route("/auth/register", post(auth_handlers::register))
        .route("/auth/login", post(auth_handlers::login))
        .route("/auth/logout", post(auth_handlers::logout))
        .route("/auth/password", patch(auth_handlers::change_password))
        // Notes
        .route("/notes", post(notes::create_note).get(notes::list_notes))
        .route("/notes/trash", get(notes::list_trash))
        .route("/notes/bookmarks", get(notes::list_bookmarks))
        .route("/notes/pinned", get(notes::list_pinned))
        .route(
            "/notes/:id",
            get(notes::get_note).patch(notes::update_note),
        )
        .route("/notes/:id/trash", put(notes::trash_note))
        .route("/notes/:id/pin", put(notes::toggle_pin))
        .route("/notes/:id/bookmark", put(notes::toggle_bookmark))
        .route("/notes/recover/:id", patch(notes::recover_note))
        .route(
            "/notes/permanent/:id",
            axum::routing::delete(notes::purge_note),
        )
        // Users
        .route(
            "/users",
            get(users::get_profile)
                .patch(users::update_profile)
                .delete(users::delete_profile),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(cors_origins(&config.allowed_origins)))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(Duration::from_secs(3600)),
        )
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .with_state(state)
}
