//! Note index synchronization and semantic retrieval.
//!
//! Ties the vector collection store and the embedding backend together:
//! [`NoteIndexer`] keeps per-user collections in step with note CRUD,
//! [`NoteRetriever`] answers top-k similarity queries, and [`NoteChat`]
//! grounds generation in retrieved note content.

pub mod indexer;
pub mod memory;
pub mod retrieval;

pub use indexer::{IndexFailure, IndexOutcome, NoteIndexer};
pub use memory::MemoryVectorStore;
pub use retrieval::{NoteChat, NoteRetriever, NO_CONTEXT_ANSWER};
