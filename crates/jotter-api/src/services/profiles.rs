//! The caller's own profile: read, patch, soft-delete.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use jotter_core::defaults::PROFILE_NOT_FOUND_MESSAGE;
use jotter_core::{Error, ProfilePatch, Result, UserProfile, UserRepository};

/// Body of `PATCH /users`. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub avatar: Option<String>,
}

impl UpdateProfileRequest {
    /// Convert into a patch, refusing fields that are present but blank.
    fn into_patch(self) -> Result<ProfilePatch> {
        Ok(ProfilePatch {
            first_name: keep("First name", self.first_name)?,
            last_name: keep("Last name", self.last_name)?,
            username: keep("Username", self.username)?,
            email_address: keep("Email Address", self.email_address)?,
            avatar: keep("Avatar", self.avatar)?,
        })
    }
}

fn keep(label: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => {
            Err(Error::InvalidInput(format!("{} cannot be empty", label)))
        }
        Some(v) => Ok(Some(v.trim().to_string())),
    }
}

pub struct ProfileService {
    users: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn get(&self, user_id: Uuid) -> Result<UserProfile> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|u| UserProfile::from(&u))
            .ok_or_else(not_found)
    }

    pub async fn update(&self, user_id: Uuid, req: UpdateProfileRequest) -> Result<UserProfile> {
        let patch = req.into_patch()?;
        if patch.is_empty() {
            return self.get(user_id).await;
        }

        let user = self
            .users
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(not_found)?;

        info!(
            subsystem = "api",
            component = "profiles",
            op = "update",
            user_id = %user_id,
            "Profile updated"
        );
        Ok(UserProfile::from(&user))
    }

    /// Soft-delete the account. Notes are left in place.
    pub async fn delete(&self, user_id: Uuid) -> Result<()> {
        if !self.users.mark_deleted(user_id).await? {
            return Err(not_found());
        }
        info!(
            subsystem = "api",
            component = "profiles",
            op = "delete",
            user_id = %user_id,
            "Account deleted"
        );
        Ok(())
    }
}

fn not_found() -> Error {
    Error::NotFound(PROFILE_NOT_FOUND_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{seed_user, store};

    #[tokio::test]
    async fn test_get_profile() {
        let store = store();
        let svc = ProfileService::new(store.clone());
        let user = seed_user(&store, "ada").await;

        let profile = svc.get(user.id).await.unwrap();
        assert_eq!(profile.username, "ada");
        assert_eq!(profile.email_address, "ada@example.com");
    }

    #[tokio::test]
    async fn test_update_patches_only_given_fields() {
        let store = store();
        let svc = ProfileService::new(store.clone());
        let user = seed_user(&store, "ada").await;

        let profile = svc
            .update(
                user.id,
                UpdateProfileRequest {
                    avatar: Some("new.png".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.avatar, "new.png");
        assert_eq!(profile.username, "ada");
        assert!(profile.last_update >= profile.date_joined);
    }

    #[tokio::test]
    async fn test_update_rejects_blank_and_taken_values() {
        let store = store();
        let svc = ProfileService::new(store.clone());
        let ada = seed_user(&store, "ada").await;
        seed_user(&store, "bob").await;

        let blank = UpdateProfileRequest {
            username: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(ada.id, blank).await,
            Err(Error::InvalidInput(_))
        ));

        let taken = UpdateProfileRequest {
            email_address: Some("bob@example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            svc.update(ada.id, taken).await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_hides_profile() {
        let store = store();
        let svc = ProfileService::new(store.clone());
        let user = seed_user(&store, "ada").await;

        svc.delete(user.id).await.unwrap();
        match svc.get(user.id).await {
            Err(Error::NotFound(msg)) => assert_eq!(msg, PROFILE_NOT_FOUND_MESSAGE),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(svc.delete(user.id).await, Err(Error::NotFound(_))));
    }
}
