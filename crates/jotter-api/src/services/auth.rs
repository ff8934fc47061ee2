//! Registration, login and password change.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use jotter_core::defaults::{
    EMAIL_TAKEN_MESSAGE, PROFILE_NOT_FOUND_MESSAGE, USERNAME_TAKEN_MESSAGE,
    WRONG_CREDENTIALS_MESSAGE,
};
use jotter_core::{Error, NewUser, Result, SessionUser, User, UserRepository};

use super::non_blank;
use crate::auth::password::{check_strength, PasswordHasher};
use crate::auth::session::SessionAuthority;

/// Body of `POST /auth/register`. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

/// Body of `POST /auth/login`. The account may be named by `identifier`,
/// `username` or `emailAddress`; the first non-blank one is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// The name to look the account up by.
    pub fn account_name(&self) -> Option<&str> {
        [&self.identifier, &self.username, &self.email_address]
            .into_iter()
            .find_map(|field| non_blank(field.as_deref()))
    }
}

/// Body of `PATCH /auth/password`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub previous_password: Option<String>,
    pub new_password: Option<String>,
}

/// A successful login: the signed token and the identity it carries.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: SessionUser,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    sessions: SessionAuthority,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        sessions: SessionAuthority,
    ) -> Self {
        Self {
            users,
            hasher,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionAuthority {
        &self.sessions
    }

    /// Create an account.
    ///
    /// Checks run in a fixed order: required fields, then email and username
    /// availability, then password strength. The first failure is returned.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        let required = [
            (req.first_name.as_deref(), "First name is required"),
            (req.last_name.as_deref(), "Last name is required"),
            (req.username.as_deref(), "Username is required"),
            (req.email_address.as_deref(), "Email Address is required"),
            (req.password.as_deref(), "Password is required"),
            (req.avatar.as_deref(), "Avatar is required"),
        ];
        for (value, message) in required {
            if non_blank(value).is_none() {
                return Err(Error::InvalidInput(message.to_string()));
            }
        }

        // Presence was checked above; blanks cannot reach this point.
        let first_name = trimmed(req.first_name);
        let last_name = trimmed(req.last_name);
        let username = trimmed(req.username);
        let email_address = trimmed(req.email_address);
        let avatar = trimmed(req.avatar);
        let password = req.password.unwrap_or_default();

        if self.users.email_exists(&email_address).await? {
            return Err(Error::Conflict(EMAIL_TAKEN_MESSAGE.to_string()));
        }
        if self.users.username_exists(&username).await? {
            return Err(Error::Conflict(USERNAME_TAKEN_MESSAGE.to_string()));
        }
        check_strength(&password)?;

        let password_hash = self.hash_blocking(password).await?;

        // A concurrent registration can still win the race; the store's
        // unique constraints turn that into the same Conflict.
        let user = self
            .users
            .create(NewUser {
                first_name,
                last_name,
                username,
                email_address,
                password_hash,
                avatar,
            })
            .await?;

        info!(
            subsystem = "api",
            component = "auth",
            op = "register",
            user_id = %user.id,
            "Account created"
        );
        Ok(user)
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown identifiers and wrong passwords fail identically, and both
    /// paths run one Argon2 verification.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome> {
        let start = Instant::now();
        let identifier = req.account_name().map(str::to_string);
        let password = req.password.unwrap_or_default();

        let user = match &identifier {
            Some(identifier) => self.users.find_by_identifier(identifier).await?,
            None => None,
        };

        let verified = match &user {
            Some(user) => {
                let hash = user.password_hash.clone();
                self.verify_blocking(password, Some(hash)).await?
            }
            None => self.verify_blocking(password, None).await?,
        };

        let user = match (user, verified) {
            (Some(user), true) => user,
            _ => {
                warn!(
                    subsystem = "api",
                    component = "auth",
                    op = "login",
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Login rejected"
                );
                return Err(wrong_credentials());
            }
        };

        let session_user = SessionUser::from(&user);
        let token = self.sessions.issue(&session_user)?;

        info!(
            subsystem = "api",
            component = "auth",
            op = "login",
            user_id = %user.id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Login succeeded"
        );
        Ok(LoginOutcome {
            token,
            user: session_user,
        })
    }

    /// Replace the caller's password after re-verifying the previous one.
    ///
    /// A wrong previous password returns before anything is written.
    pub async fn change_password(&self, user_id: Uuid, req: ChangePasswordRequest) -> Result<()> {
        let previous = req
            .previous_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::InvalidInput("Previous password is required".to_string()))?;
        let new_password = req
            .new_password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::InvalidInput("New password is required".to_string()))?;
        check_strength(&new_password)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(PROFILE_NOT_FOUND_MESSAGE.to_string()))?;

        if !self
            .verify_blocking(previous, Some(user.password_hash.clone()))
            .await?
        {
            debug!(
                subsystem = "api",
                component = "auth",
                op = "change_password",
                user_id = %user_id,
                "Previous password mismatch"
            );
            return Err(Error::InvalidCredentials(
                "Previous password is incorrect".to_string(),
            ));
        }

        let hash = self.hash_blocking(new_password).await?;
        self.users.update_password_hash(user_id, &hash).await?;

        info!(
            subsystem = "api",
            component = "auth",
            op = "change_password",
            user_id = %user_id,
            "Password changed"
        );
        Ok(())
    }

    async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| Error::Internal(format!("hashing task failed: {}", e)))?
    }

    /// Verify on the blocking pool. `None` verifies against the dummy hash.
    async fn verify_blocking(&self, password: String, hash: Option<String>) -> Result<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => Ok(hasher.verify_dummy(&password)),
        })
        .await
        .map_err(|e| Error::Internal(format!("verification task failed: {}", e)))?
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn wrong_credentials() -> Error {
    Error::InvalidCredentials(WRONG_CREDENTIALS_MESSAGE.to_string())
}
