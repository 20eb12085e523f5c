//! PostgreSQL + pgvector storage layer for notelet.
//!
//! The primary store (accounts, sessions, notes) and the embedding index
//! share one database. Vector records are derived and disposable; the note
//! table is always the source of truth.

pub mod notes;
pub mod pool;
pub mod users;
pub mod vector_store;

pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use users::PgUserRepository;
pub use vector_store::PgVectorStore;

use sqlx::postgres::PgPool;

use notelet_core::Result;

/// Escape LIKE pattern special characters in user input.
pub(crate) fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Aggregated handle over all repositories sharing one pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    pub users: PgUserRepository,
    pub notes: PgNoteRepository,
    pub vectors: PgVectorStore,
}

impl Database {
    /// Assemble repositories over an existing pool.
    pub fn new(pool: PgPool, embed_dimension: usize) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            vectors: PgVectorStore::new(pool.clone(), embed_dimension),
            pool,
        }
    }

    /// Connect with default pool configuration and assemble repositories.
    pub async fn connect(database_url: &str, embed_dimension: usize) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::new(pool, embed_dimension))
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending schema migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| notelet_core::Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}
