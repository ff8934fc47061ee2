//! Shared application state.

use std::sync::Arc;

use jotter_core::{NoteRepository, RelationRepository, Result, UserRepository};
use jotter_db::{Database, MemoryStore};

use crate::auth::password::PasswordHasher;
use crate::auth::session::SessionAuthority;
use crate::config::ApiConfig;
use crate::services::{AuthService, NoteService, ProfileService, RelationService};

/// The three stores every service is built from.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub relations: Arc<dyn RelationRepository>,
}

impl Stores {
    /// PostgreSQL-backed stores.
    pub fn postgres(db: Database) -> Self {
        Self {
            users: Arc::new(db.users),
            notes: Arc::new(db.notes),
            relations: Arc::new(db.relations),
        }
    }

    /// One in-memory store behind all three traits.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            users: store.clone(),
            notes: store.clone(),
            relations: store,
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub notes: Arc<NoteService>,
    pub relations: Arc<RelationService>,
    pub profiles: Arc<ProfileService>,
    /// Whether session cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(stores: Stores, config: &ApiConfig) -> Result<Self> {
        let hasher = PasswordHasher::new(config.password)?;
        let sessions = SessionAuthority::new(&config.session_secret)?;

        Ok(Self {
            auth: Arc::new(AuthService::new(stores.users.clone(), hasher, sessions)),
            notes: Arc::new(NoteService::new(stores.notes.clone())),
            relations: Arc::new(RelationService::new(
                stores.notes,
                stores.relations,
                config.pin_scope,
            )),
            profiles: Arc::new(ProfileService::new(stores.users)),
            cookie_secure: config.cookie_secure,
        })
    }
}
