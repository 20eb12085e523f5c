//! pgvector-backed vector collection store.
//!
//! Each user owns one collection row; embedding records live in
//! `note_embedding` keyed by (collection_id, record_id). Similarity search
//! uses the cosine distance operator `<=>`.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, info};
use uuid::Uuid;

use notelet_core::{collection_name, Collection, Error, Result, ScoredDocument, VectorStore};

/// PostgreSQL + pgvector implementation of [`VectorStore`].
#[derive(Clone)]
pub struct PgVectorStore {
    pool: Pool<Postgres>,
    dimension: usize,
}

impl PgVectorStore {
    /// Create a new store over the given pool, validating vectors against
    /// `dimension` on write.
    pub fn new(pool: Pool<Postgres>, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    /// Configured embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::InvalidInput(format!(
                "Vector dimension {} does not match store dimension {}",
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn get_or_create_collection(&self, owner_id: i64) -> Result<Collection> {
        let name = collection_name(owner_id);

        // Race-safe lazy creation: concurrent callers both land on the same
        // row, the loser of the insert falls through to the select.
        let inserted = sqlx::query(
            "INSERT INTO collection (id, owner_id, name)
             VALUES ($1, $2, $3)
             ON CONFLICT (owner_id) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&name)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if inserted.rows_affected() > 0 {
            info!(
                subsystem = "index",
                component = "vector_store",
                op = "create_collection",
                owner_id,
                collection = %name,
                "Collection created"
            );
        }

        let row = sqlx::query("SELECT id, owner_id, name FROM collection WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(Collection {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            name: row.get("name"),
        })
    }

    async fn upsert(
        &self,
        collection: &Collection,
        id: &str,
        vector: &[f32],
        document: &str,
    ) -> Result<()> {
        self.check_dimension(vector)?;

        sqlx::query(
            "INSERT INTO note_embedding (collection_id, record_id, vector, document, updated_at)
             VALUES ($1, $2, $3, $4, now())
             ON CONFLICT (collection_id, record_id)
             DO UPDATE SET vector = EXCLUDED.vector,
                           document = EXCLUDED.document,
                           updated_at = now()",
        )
        .bind(collection.id)
        .bind(id)
        .bind(Vector::from(vector.to_vec()))
        .bind(document)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "index",
            component = "vector_store",
            op = "upsert",
            collection = %collection.name,
            record_id = id,
            "Embedding record upserted"
        );
        Ok(())
    }

    async fn delete(&self, collection: &Collection, id: &str) -> Result<()> {
        // Deleting an absent record is a no-op, matching removal after a
        // failed or skipped indexing pass.
        let result = sqlx::query(
            "DELETE FROM note_embedding WHERE collection_id = $1 AND record_id = $2",
        )
        .bind(collection.id)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "index",
            component = "vector_store",
            op = "delete",
            collection = %collection.name,
            record_id = id,
            removed = result.rows_affected(),
            "Embedding record delete"
        );
        Ok(())
    }

    async fn query(
        &self,
        collection: &Collection,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        self.check_dimension(vector)?;
        if k == 0 {
            return Ok(vec![]);
        }

        let rows = sqlx::query(
            "SELECT record_id, document, vector <=> $2::vector AS distance
             FROM note_embedding
             WHERE collection_id = $1
             ORDER BY vector <=> $2::vector
             LIMIT $3",
        )
        .bind(collection.id)
        .bind(Vector::from(vector.to_vec()))
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(|row| ScoredDocument {
                id: row.get("record_id"),
                document: row.get("document"),
                distance: row.get::<f64, _>("distance") as f32,
            })
            .collect())
    }
}
