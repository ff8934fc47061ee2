//! Session cookie helpers.

use axum::http::{header, HeaderMap, HeaderValue};

use jotter_core::defaults::SESSION_COOKIE;
use jotter_core::{Error, Result};

/// `Set-Cookie` value carrying a freshly issued token that expires after
/// `max_age_secs`.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Result<HeaderValue> {
    build(token, max_age_secs, secure)
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue> {
    build("", 0, secure)
}

fn build(value: &str, max_age: i64, secure: bool) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
        .map_err(|e| Error::Internal(format!("invalid cookie header: {}", e)))
}

/// Find a cookie by name across every `Cookie` header.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Token from an `Authorization: Bearer` header.
pub fn read_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
