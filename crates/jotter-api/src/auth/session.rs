//! Stateless session tokens.
//!
//! A token is a compact HS256 JWS: `base64url(header).base64url(claims).base64url(mac)`
//! where the MAC is HMAC-SHA256 over the first two segments. Claims carry the
//! session identity plus `iat` / `exp` in Unix seconds. Nothing is stored
//! server-side, so a token stays valid until it expires.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use jotter_core::defaults::{SESSION_SECRET_MIN_LEN, SESSION_TTL_DAYS};
use jotter_core::{Error, Result, SessionUser};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Deserialize)]
struct Header {
    alg: String,
}

/// Decoded token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub user: SessionUser,
    /// Issued-at, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

impl SessionClaims {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

/// Issues and verifies session tokens with one signing key.
#[derive(Clone)]
pub struct SessionAuthority {
    key: Vec<u8>,
    ttl: Duration,
}

impl SessionAuthority {
    /// Build an authority with the default 21-day lifetime.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.len() < SESSION_SECRET_MIN_LEN {
            return Err(Error::Config(format!(
                "session secret must be at least {} bytes",
                SESSION_SECRET_MIN_LEN
            )));
        }
        Ok(Self {
            key: secret.as_bytes().to_vec(),
            ttl: Duration::days(SESSION_TTL_DAYS),
        })
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| Error::Internal(format!("invalid signing key: {}", e)))
    }

    /// Issue a token for `user`, valid from now.
    pub fn issue(&self, user: &SessionUser) -> Result<String> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user: &SessionUser, now: DateTime<Utc>) -> Result<String> {
        let claims = SessionClaims {
            user: user.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(TOKEN_HEADER),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// The signature is checked (constant time) before anything in the
    /// payload is trusted.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims> {
        let mut parts = token.trim().split('.');
        let (header_b64, claims_b64, sig_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(c), Some(s)) if parts.next().is_none() => (h, c, s),
            _ => return Err(malformed()),
        };

        let signature = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| malformed())?;
        let mut mac = self.mac()?;
        mac.update(header_b64.as_bytes());
        mac.update(b".");
        mac.update(claims_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| Error::Unauthorized("Invalid session token".to_string()))?;

        let header_bytes = URL_SAFE_NO_PAD.decode(header_b64).map_err(|_| malformed())?;
        let header: Header = serde_json::from_slice(&header_bytes).map_err(|_| malformed())?;
        if header.alg != "HS256" {
            return Err(Error::Unauthorized(
                "Unsupported session token algorithm".to_string(),
            ));
        }

        let claims_bytes = URL_SAFE_NO_PAD.decode(claims_b64).map_err(|_| malformed())?;
        let claims: SessionClaims =
            serde_json::from_slice(&claims_bytes).map_err(|_| malformed())?;

        if claims.exp <= now.timestamp() {
            return Err(Error::Unauthorized("Session expired".to_string()));
        }
        Ok(claims)
    }
}

fn malformed() -> Error {
    Error::Unauthorized("Malformed session token".to_string())
}
