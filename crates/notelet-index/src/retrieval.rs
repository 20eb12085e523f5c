//! Semantic retrieval and retrieval-grounded chat.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use notelet_core::{defaults, EmbeddingBackend, GenerationBackend, Result, VectorStore};

/// Answer returned when retrieval yields nothing to ground a chat response.
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant information in your notes to answer that question.";

const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer based ONLY on the \
provided context from the user's notes. If the context does not contain the answer, say \
that you couldn't find the information in their notes.";

/// Top-k semantic search over a user's indexed notes.
pub struct NoteRetriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingBackend>,
}

impl NoteRetriever {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self { store, embedder }
    }

    /// Return the contents of the `k` notes nearest to `query`, nearest
    /// first. Blank queries yield no results without touching the index.
    pub async fn query_notes(
        &self,
        owner_id: i64,
        query: &str,
        k: Option<usize>,
    ) -> Result<Vec<String>> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }
        let k = k.unwrap_or(defaults::DEFAULT_TOP_K);
        let start = Instant::now();

        let vector = self.embedder.embed_query(query).await?;
        let collection = self.store.get_or_create_collection(owner_id).await?;
        let hits = self.store.query(&collection, &vector, k).await?;

        debug!(
            subsystem = "index",
            component = "retriever",
            op = "query_notes",
            owner_id,
            k,
            result_count = hits.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Retrieval complete"
        );
        Ok(hits.into_iter().map(|hit| hit.document).collect())
    }
}

/// Retrieval-grounded question answering over a user's notes.
pub struct NoteChat {
    retriever: NoteRetriever,
    generator: Arc<dyn GenerationBackend>,
}

impl NoteChat {
    pub fn new(retriever: NoteRetriever, generator: Arc<dyn GenerationBackend>) -> Self {
        Self { retriever, generator }
    }

    /// Answer a question using only retrieved note content as context.
    ///
    /// When retrieval returns nothing, a fixed answer is returned and the
    /// generation backend is never invoked.
    pub async fn ask(&self, owner_id: i64, question: &str) -> Result<String> {
        let context_docs = self.retriever.query_notes(owner_id, question, None).await?;

        if context_docs.is_empty() {
            info!(
                subsystem = "index",
                component = "chat",
                op = "ask",
                owner_id,
                "No relevant notes retrieved, skipping generation"
            );
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        let context = context_docs.join("\n\n");
        let prompt = format!("Context:\n{}\n\nQuestion: {}\n\nAnswer:", context, question);

        let start = Instant::now();
        let answer = self
            .generator
            .generate_with_system(CHAT_SYSTEM_PROMPT, &prompt)
            .await?;

        info!(
            subsystem = "index",
            component = "chat",
            op = "ask",
            owner_id,
            context_count = context_docs.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat answer generated"
        );
        Ok(answer)
    }
}
