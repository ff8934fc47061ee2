//! HTTP error mapping.
//!
//! Every failure leaves the server as `{"message": "..."}`. Internal errors
//! are logged with full detail and answered with a generic message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use jotter_core::defaults::INTERNAL_ERROR_MESSAGE;

#[derive(Debug)]
pub enum ApiError {
    Internal(jotter_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<jotter_core::Error> for ApiError {
    fn from(err: jotter_core::Error) -> Self {
        use jotter_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            // Duplicate usernames / emails are reported as plain 400s.
            Error::InvalidInput(msg) | Error::Conflict(msg) | Error::InvalidCredentials(msg) => {
                ApiError::BadRequest(msg)
            }
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    component = "error",
                    error = %err,
                    "Request failed with internal error"
                );
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::Unauthorized(msg) | ApiError::NotFound(msg) | ApiError::BadRequest(msg) => {
                msg
            }
        };

        (status, Json(serde_json::json!({ "message": message }))).into_response()
    }
}
