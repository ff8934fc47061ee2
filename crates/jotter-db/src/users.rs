//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use jotter_core::defaults::{EMAIL_TAKEN_MESSAGE, USERNAME_TAKEN_MESSAGE};
use jotter_core::{new_v7, Error, NewUser, ProfilePatch, Result, User, UserRepository};

const USER_COLUMNS: &str = "id, first_name, last_name, username, email_address, password_hash, \
     avatar, date_joined, last_update, is_deleted";

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Translate a unique-constraint violation on `app_user` into a `Conflict`
/// naming the field that clashed. Other errors pass through unchanged.
pub(crate) fn map_user_write_error(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some(c) if c.contains("email") => EMAIL_TAKEN_MESSAGE,
                _ => USERNAME_TAKEN_MESSAGE,
            };
            return Error::Conflict(message.to_string());
        }
    }
    Error::Database(err)
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM app_user \
             WHERE (username = $1 OR email_address = $1) AND is_deleted = FALSE \
             LIMIT 1",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM app_user WHERE id = $1 AND is_deleted = FALSE",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn email_exists(&self, email_address: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE email_address = $1)")
                .bind(email_address)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn create(&self, user: NewUser) -> Result<User> {
        let id = new_v7();
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO app_user (id, first_name, last_name, username, email_address, \
             password_hash, avatar, date_joined, last_update, is_deleted) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, FALSE) \
             RETURNING {}",
            USER_COLUMNS
        );
        let created = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .bind(&user.email_address)
            .bind(&user.password_hash)
            .bind(&user.avatar)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_write_error)?;

        debug!(
            subsystem = "db",
            component = "users",
            op = "create",
            user_id = %created.id,
            "User created"
        );
        Ok(created)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            "UPDATE app_user SET password_hash = $1, last_update = $2 \
             WHERE id = $3 AND is_deleted = FALSE",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> Result<Option<User>> {
        // COALESCE keeps the stored value for every field the patch leaves unset.
        let sql = format!(
            "UPDATE app_user SET \
               first_name = COALESCE($1, first_name), \
               last_name = COALESCE($2, last_name), \
               username = COALESCE($3, username), \
               email_address = COALESCE($4, email_address), \
               avatar = COALESCE($5, avatar), \
               last_update = $6 \
             WHERE id = $7 AND is_deleted = FALSE \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(patch.first_name)
            .bind(patch.last_name)
            .bind(patch.username)
            .bind(patch.email_address)
            .bind(patch.avatar)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_write_error)
    }

    async fn mark_deleted(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE app_user SET is_deleted = TRUE, last_update = $1 \
             WHERE id = $2 AND is_deleted = FALSE",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
