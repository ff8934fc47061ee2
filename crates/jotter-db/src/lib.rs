//! # jotter-db
//!
//! PostgreSQL database layer for jotter.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, notes and pin / bookmark relations
//! - Embedded schema migrations
//! - An in-memory store implementing the same traits, for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use jotter_db::{Database, NewNote, NoteRepository, PoolConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/jotter", &PoolConfig::default()).await?;
//!     db.migrate().await?;
//!
//!     let note = db.notes.insert(NewNote {
//!         owner_id,
//!         entry_title: "Groceries".to_string(),
//!         synopsis: None,
//!         content: "milk, eggs".to_string(),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```
pub mod memory;
pub mod notes;
pub mod pool;
pub mod relations;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use jotter_core::*;

pub use memory::MemoryStore;
pub use notes::PgNoteRepository;
pub use pool::{connect_pool, PoolConfig};
pub use relations::PgRelationRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User account repository.
    pub users: PgUserRepository,
    /// Note repository for CRUD and lifecycle transitions.
    pub notes: PgNoteRepository,
    /// Pin and bookmark repository.
    pub relations: PgRelationRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            relations: PgRelationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool with `config` and build the repositories on it.
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self> {
        let pool = connect_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
