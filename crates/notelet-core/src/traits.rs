//! Core traits for notelet abstractions.
//!
//! These traits define the seams between the primary note store, the vector
//! index, and the inference backends, enabling pluggable implementations and
//! testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Collection, Note, ScoredDocument};

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone, Default)]
pub struct CreateNoteRequest {
    /// Defaults to "Untitled" when absent.
    pub title: Option<String>,
    pub content: String,
    /// Comma-delimited tag list. Defaults to empty.
    pub tags: Option<String>,
}

/// Request for updating an existing note. All fields are replaced.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteRequest {
    pub title: String,
    pub content: String,
    pub tags: String,
}

/// Repository for note CRUD operations in the primary store.
///
/// Every operation is scoped to an owner: a user can never read or mutate
/// another user's notes through this interface.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note and return its assigned id.
    async fn insert(&self, owner_id: i64, req: CreateNoteRequest) -> Result<i64>;

    /// Fetch a note by id.
    async fn fetch(&self, owner_id: i64, note_id: i64) -> Result<Note>;

    /// List notes newest-first, optionally filtered by tag substring.
    async fn list(&self, owner_id: i64, tag: Option<&str>) -> Result<Vec<Note>>;

    /// Replace a note's title, content, and tags.
    async fn update(&self, owner_id: i64, note_id: i64, req: UpdateNoteRequest) -> Result<()>;

    /// Delete a note.
    async fn delete(&self, owner_id: i64, note_id: i64) -> Result<()>;

    /// Substring search over title and content, newest-first.
    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>>;

    /// All distinct tags across the owner's notes, sorted.
    async fn all_tags(&self, owner_id: i64) -> Result<Vec<String>>;
}

// =============================================================================
// VECTOR COLLECTION STORE
// =============================================================================

/// Namespaced storage and similarity search over embedding vectors.
///
/// Each user owns exactly one collection, created lazily on first use and
/// named deterministically from the owner id. Implementations must be safe
/// under concurrent calls to different collections.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Get or lazily create the owner's collection. Idempotent; never errors
    /// because the collection already exists.
    async fn get_or_create_collection(&self, owner_id: i64) -> Result<Collection>;

    /// Insert or replace the record at `id`. Overwrite is not an error.
    ///
    /// Returns [`crate::Error::InvalidInput`] if the vector's dimensionality
    /// does not match the store's configured dimension.
    async fn upsert(
        &self,
        collection: &Collection,
        id: &str,
        vector: &[f32],
        document: &str,
    ) -> Result<()>;

    /// Remove the record at `id` if present. Absent ids are not an error.
    async fn delete(&self, collection: &Collection, id: &str) -> Result<()>;

    /// Return at most `k` documents nearest to `vector`, nearest first.
    /// An empty collection yields an empty vec, never an error.
    async fn query(
        &self,
        collection: &Collection,
        vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredDocument>>;
}

// =============================================================================
// INFERENCE
// =============================================================================

/// Backend for generating text embeddings.
///
/// Document mode and query mode are distinct: asymmetric models position
/// stored documents and search queries differently in the embedding space.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed texts for storage and indexing (document mode).
    ///
    /// Returns one vector per input text.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a search query (query mode).
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Expected dimension of produced vectors.
    fn dimension(&self) -> usize;

    /// Model name being used.
    fn model_name(&self) -> &str;
}

/// Backend for text generation (LLM).
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with a system instruction.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Model name being used.
    fn model_name(&self) -> &str;
}
