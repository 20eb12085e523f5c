//! In-memory vector store.
//!
//! Exact brute-force cosine search over per-user collections held in a
//! RwLock'd map. Used by tests and useful for small single-process
//! deployments that do not want PostgreSQL for the index.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use notelet_core::{collection_name, Collection, Error, Result, ScoredDocument, VectorStore};

struct StoredRecord {
    vector: Vec<f32>,
    document: String,
}

struct OwnerCollection {
    meta: Collection,
    records: HashMap<String, StoredRecord>,
}

/// In-memory implementation of [`VectorStore`].
pub struct MemoryVectorStore {
    dimension: usize,
    collections: RwLock<HashMap<i64, OwnerCollection>>,
    fail_writes: AtomicBool,
}

impl MemoryVectorStore {
    /// Create a new empty store with the given embedding dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            collections: RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Toggle simulated write failure for upsert and delete (test support,
    /// like the mock backend's failure injection).
    pub fn set_storage_failure(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Internal("simulated storage failure".to_string()));
        }
        Ok(())
    }

    /// Configured embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of records in an owner's collection. Zero if absent.
    pub fn record_count(&self, owner_id: i64) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(&owner_id)
            .map(|c| c.records.len())
            .unwrap_or(0)
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

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (mag_a * mag_b)
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn get_or_create_collection(&self, owner_id: i64) -> Result<Collection> {
        let mut collections = self.collections.write().unwrap();
        let entry = collections.entry(owner_id).or_insert_with(|| OwnerCollection {
            meta: Collection {
                id: Uuid::new_v4(),
                owner_id,
                name: collection_name(owner_id),
            },
            records: HashMap::new(),
        });
        Ok(entry.meta.clone())
    }

    async fn upsert(
        &self,
        collection: &Collection,
        id: &str,
        vector: &[f32],
        document: &str,
    ) -> Result<()> {
        self.check_dimension(vector)?;
        self.check_writable()?;

        let mut collections = self.collections.write().unwrap();
        let owner = collections
            .get_mut(&collection.owner_id)
            .ok_or_else(|| Error::NotFound(format!("Collection {}", collection.name)))?;
        owner.records.insert(
            id.to_string(),
            StoredRecord {
                vector: vector.to_vec(),
                document: document.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, collection: &Collection, id: &str) -> Result<()> {
        self.check_writable()?;

        let mut collections = self.collections.write().unwrap();
        if let Some(owner) = collections.get_mut(&collection.owner_id) {
            owner.records.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &Collection,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>> {
        self.check_dimension(vector)?;

        let collections = self.collections.read().unwrap();
        let Some(owner) = collections.get(&collection.owner_id) else {
            return Ok(vec![]);
        };

        let mut scored: Vec<ScoredDocument> = owner
            .records
            .iter()
            .map(|(id, record)| ScoredDocument {
                id: id.clone(),
                document: record.document.clone(),
                distance: cosine_distance(vector, &record.vector),
            })
            .collect();

        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collection_created_lazily_once() {
        let store = MemoryVectorStore::new(4);

        let c1 = store.get_or_create_collection(7).await.unwrap();
        let c2 = store.get_or_create_collection(7).await.unwrap();

        assert_eq!(c1, c2);
        assert_eq!(c1.name, "user_7_notes");
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let store = MemoryVectorStore::new(2);
        let coll = store.get_or_create_collection(1).await.unwrap();

        store.upsert(&coll, "5", &[1.0, 0.0], "first").await.unwrap();
        store.upsert(&coll, "5", &[0.0, 1.0], "second").await.unwrap();

        assert_eq!(store.record_count(1), 1);
        let hits = store.query(&coll, &[0.0, 1.0], 3).await.unwrap();
        assert_eq!(hits[0].document, "second");
    }

    #[tokio::test]
    async fn test_delete_absent_id_ok() {
        let store = MemoryVectorStore::new(2);
        let coll = store.get_or_create_collection(1).await.unwrap();
        assert!(store.delete(&coll, "missing").await.is_ok());
    }

    #[tokio::test]
    async fn test_query_empty_collection() {
        let store = MemoryVectorStore::new(2);
        let coll = store.get_or_create_collection(1).await.unwrap();
        let hits = store.query(&coll, &[1.0, 0.0], 3).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_nearest_first_and_truncated() {
        let store = MemoryVectorStore::new(2);
        let coll = store.get_or_create_collection(1).await.unwrap();

        store.upsert(&coll, "a", &[1.0, 0.0], "east").await.unwrap();
        store.upsert(&coll, "b", &[0.0, 1.0], "north").await.unwrap();
        store.upsert(&coll, "c", &[0.7, 0.7], "diagonal").await.unwrap();

        let hits = store.query(&coll, &[1.0, 0.1], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, "east");
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_storage_failure_toggle() {
        let store = MemoryVectorStore::new(2);
        let coll = store.get_or_create_collection(1).await.unwrap();

        store.set_storage_failure(true);
        let err = store.upsert(&coll, "a", &[1.0, 0.0], "doc").await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
        assert!(store.delete(&coll, "a").await.is_err());

        store.set_storage_failure(false);
        assert!(store.upsert(&coll, "a", &[1.0, 0.0], "doc").await.is_ok());
    }

    #[tokio::test]
    async fn test_dimension_enforced() {
        let store = MemoryVectorStore::new(3);
        let coll = store.get_or_create_collection(1).await.unwrap();
        let err = store.upsert(&coll, "x", &[1.0], "doc").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
