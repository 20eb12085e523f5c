//! Note index synchronization.
//!
//! Keeps the per-user embedding collection in step with note CRUD. Indexing
//! is best-effort: failures are absorbed into a typed outcome so the primary
//! note operation is never rolled back by a degraded index.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use notelet_core::{EmbeddingBackend, VectorStore};

/// Why an indexing pass did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexFailure {
    /// The embedding provider failed or returned malformed output.
    Embedding(String),
    /// The vector store rejected or failed the write.
    Storage(String),
}

/// Result of a single index synchronization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The note's embedding record was written.
    Indexed,
    /// The note's embedding record was removed (or was already absent).
    Removed,
    /// The content was empty; the index was deliberately left untouched.
    SkippedEmpty,
    /// The pass failed; the index may be stale for this note.
    Failed(IndexFailure),
}

impl IndexOutcome {
    /// Whether the index is in step with the primary store for this note.
    pub fn is_synchronized(&self) -> bool {
        !matches!(self, IndexOutcome::Failed(_))
    }
}

/// Synchronizes note content into the owner's embedding collection.
pub struct NoteIndexer {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingBackend>,
}

impl NoteIndexer {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self { store, embedder }
    }

    /// Embed and upsert a note's content into the owner's collection.
    ///
    /// Empty or whitespace-only content is a no-op: any previously indexed
    /// record for the note is left in place.
    pub async fn add_or_update_note(
        &self,
        owner_id: i64,
        note_id: i64,
        content: &str,
    ) -> IndexOutcome {
        if content.trim().is_empty() {
            debug!(
                subsystem = "index",
                component = "indexer",
                op = "add_or_update",
                owner_id,
                note_id,
                "Empty content, index left untouched"
            );
            return IndexOutcome::SkippedEmpty;
        }

        let start = Instant::now();

        let vectors = match self.embedder.embed_documents(&[content.to_string()]).await {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!(
                    subsystem = "index",
                    component = "indexer",
                    op = "add_or_update",
                    owner_id,
                    note_id,
                    error = %e,
                    "Embedding provider failed, index is stale for this note"
                );
                return IndexOutcome::Failed(IndexFailure::Embedding(e.to_string()));
            }
        };
        let Some(vector) = vectors.first() else {
            warn!(
                subsystem = "index",
                component = "indexer",
                op = "add_or_update",
                owner_id,
                note_id,
                "Embedding provider returned no vectors"
            );
            return IndexOutcome::Failed(IndexFailure::Embedding(
                "provider returned no vectors".to_string(),
            ));
        };

        let result = async {
            let collection = self.store.get_or_create_collection(owner_id).await?;
            self.store
                .upsert(&collection, &note_id.to_string(), vector, content)
                .await
        }
        .await;

        match result {
            Ok(()) => {
                info!(
                    subsystem = "index",
                    component = "indexer",
                    op = "add_or_update",
                    owner_id,
                    note_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Note indexed"
                );
                IndexOutcome::Indexed
            }
            Err(e) => {
                error!(
                    subsystem = "index",
                    component = "indexer",
                    op = "add_or_update",
                    owner_id,
                    note_id,
                    error = %e,
                    "Vector store write failed, index is stale for this note"
                );
                IndexOutcome::Failed(IndexFailure::Storage(e.to_string()))
            }
        }
    }

    /// Remove a note's embedding record from the owner's collection.
    ///
    /// Removing a record that was never indexed is not an error.
    pub async fn remove_note(&self, owner_id: i64, note_id: i64) -> IndexOutcome {
        let result = async {
            let collection = self.store.get_or_create_collection(owner_id).await?;
            self.store.delete(&collection, &note_id.to_string()).await
        }
        .await;

        match result {
            Ok(()) => {
                debug!(
                    subsystem = "index",
                    component = "indexer",
                    op = "remove",
                    owner_id,
                    note_id,
                    "Note removed from index"
                );
                IndexOutcome::Removed
            }
            Err(e) => {
                error!(
                    subsystem = "index",
                    component = "indexer",
                    op = "remove",
                    owner_id,
                    note_id,
                    error = %e,
                    "Vector store delete failed, index is stale for this note"
                );
                IndexOutcome::Failed(IndexFailure::Storage(e.to_string()))
            }
        }
    }
}
