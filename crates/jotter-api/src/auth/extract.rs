//! Authentication extractor.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use jotter_core::defaults::SESSION_COOKIE;

use super::cookie::{read_bearer, read_cookie};
use super::session::SessionClaims;
use crate::error::ApiError;
use crate::state::AppState;

/// Extractor that requires a valid session token.
///
/// The token is taken from an `Authorization: Bearer` header when present,
/// otherwise from the `authToken` cookie.
///
/// ```ignore
/// async fn handler(user: RequireUser) -> impl IntoResponse {
///     format!("hello {}", user.claims.user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser {
    pub claims: SessionClaims,
}

impl RequireUser {
    /// The acting user's id.
    pub fn id(&self) -> Uuid {
        self.claims.user_id()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match read_bearer(&parts.headers)
            .or_else(|| read_cookie(&parts.headers, SESSION_COOKIE))
        {
            Some(token) => token,
            None => {
                warn!(
                    subsystem = "api",
                    component = "auth",
                    op = "authenticate",
                    path = %parts.uri.path(),
                    "Request rejected: no session token"
                );
                return Err(ApiError::Unauthorized(
                    "Authentication required".to_string(),
                ));
            }
        };

        match state.auth.sessions().verify(token) {
            Ok(claims) => Ok(RequireUser { claims }),
            Err(err) => {
                warn!(
                    subsystem = "api",
                    component = "auth",
                    op = "authenticate",
                    path = %parts.uri.path(),
                    error = %err,
                    "Request rejected: bad session token"
                );
                Err(err.into())
            }
        }
    }
}
