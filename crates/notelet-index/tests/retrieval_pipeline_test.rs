//! End-to-end tests for the indexing and retrieval pipeline over the
//! in-memory vector store and the mock inference backend.

use std::sync::Arc;

use notelet_core::{EmbeddingBackend, GenerationBackend, VectorStore};
use notelet_index::{
    IndexFailure, IndexOutcome, MemoryVectorStore, NoteChat, NoteIndexer, NoteRetriever,
    NO_CONTEXT_ANSWER,
};
use notelet_inference::MockInferenceBackend;

const DIM: usize = 384;

struct Pipeline {
    store: Arc<MemoryVectorStore>,
    backend: MockInferenceBackend,
    indexer: NoteIndexer,
}

impl Pipeline {
    fn new() -> Self {
        let store = Arc::new(MemoryVectorStore::new(DIM));
        let backend = MockInferenceBackend::new().with_dimension(DIM);
        let indexer = NoteIndexer::new(
            store.clone() as Arc<dyn VectorStore>,
            Arc::new(backend.clone()) as Arc<dyn EmbeddingBackend>,
        );
        Self {
            store,
            backend,
            indexer,
        }
    }

    fn retriever(&self) -> NoteRetriever {
        NoteRetriever::new(
            self.store.clone() as Arc<dyn VectorStore>,
            Arc::new(self.backend.clone()) as Arc<dyn EmbeddingBackend>,
        )
    }

    fn chat(&self) -> NoteChat {
        NoteChat::new(
            self.retriever(),
            Arc::new(self.backend.clone()) as Arc<dyn GenerationBackend>,
        )
    }
}

#[tokio::test]
async fn test_indexed_note_is_retrievable() {
    let p = Pipeline::new();

    let outcome = p
        .indexer
        .add_or_update_note(1, 42, "The mitochondria is the powerhouse of the cell")
        .await;
    assert_eq!(outcome, IndexOutcome::Indexed);

    let docs = p
        .retriever()
        .query_notes(1, "what is the powerhouse of the cell", None)
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].contains("mitochondria"));
}

#[tokio::test]
async fn test_retrieval_never_crosses_owners() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;
    p.indexer
        .add_or_update_note(2, 2, "Berlin is the capital of Germany")
        .await;

    let docs = p
        .retriever()
        .query_notes(2, "capital of France Paris", None)
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
    assert!(
        docs[0].contains("Berlin"),
        "Owner 2 must only ever see their own notes"
    );
}

#[tokio::test]
async fn test_nearest_note_ranks_first() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;
    p.indexer
        .add_or_update_note(1, 2, "The mitochondria is the powerhouse of the cell")
        .await;
    p.indexer
        .add_or_update_note(1, 3, "Rust ownership prevents data races")
        .await;

    let docs = p
        .retriever()
        .query_notes(1, "what is the capital of France", None)
        .await
        .unwrap();

    assert!(docs[0].contains("Paris"), "Expected Paris first, got {:?}", docs);
}

#[tokio::test]
async fn test_update_reindexes_and_reranks() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Grocery list milk eggs bread")
        .await;
    p.indexer
        .add_or_update_note(1, 2, "Weekend hiking plan")
        .await;

    // Note 2 now becomes about France; queries about France should surface
    // the updated content, not the old.
    let outcome = p
        .indexer
        .add_or_update_note(1, 2, "Paris is the capital of France")
        .await;
    assert_eq!(outcome, IndexOutcome::Indexed);
    assert_eq!(p.store.record_count(1), 2);

    let docs = p
        .retriever()
        .query_notes(1, "capital of France", None)
        .await
        .unwrap();
    assert!(docs[0].contains("Paris"));
    assert!(!docs.iter().any(|d| d.contains("hiking")));
}

#[tokio::test]
async fn test_delete_removes_from_index() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;
    let outcome = p.indexer.remove_note(1, 1).await;
    assert_eq!(outcome, IndexOutcome::Removed);

    let docs = p
        .retriever()
        .query_notes(1, "capital of France", None)
        .await
        .unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_remove_never_indexed_note_is_ok() {
    let p = Pipeline::new();
    assert_eq!(p.indexer.remove_note(1, 999).await, IndexOutcome::Removed);
}

#[tokio::test]
async fn test_query_with_no_notes_is_empty() {
    let p = Pipeline::new();
    let docs = p.retriever().query_notes(1, "anything", None).await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn test_blank_query_short_circuits() {
    let p = Pipeline::new();
    p.indexer.add_or_update_note(1, 1, "some note").await;

    let docs = p.retriever().query_notes(1, "   ", None).await.unwrap();
    assert!(docs.is_empty());
    assert_eq!(p.backend.embed_call_count(), 1, "Only the indexing embed");
}

#[tokio::test]
async fn test_empty_content_preserves_prior_record() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;

    let outcome = p.indexer.add_or_update_note(1, 1, "   ").await;
    assert_eq!(outcome, IndexOutcome::SkippedEmpty);

    // The previous embedding still answers queries.
    let docs = p
        .retriever()
        .query_notes(1, "capital of France", None)
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert!(docs[0].contains("Paris"));
}

#[tokio::test]
async fn test_top_k_limits_results() {
    let p = Pipeline::new();

    for id in 1..=5 {
        p.indexer
            .add_or_update_note(1, id, &format!("France note number {}", id))
            .await;
    }

    let default = p.retriever().query_notes(1, "France", None).await.unwrap();
    assert_eq!(default.len(), 3);

    let five = p.retriever().query_notes(1, "France", Some(5)).await.unwrap();
    assert_eq!(five.len(), 5);
}

#[tokio::test]
async fn test_embedding_failure_leaves_store_untouched() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;

    p.backend.set_embedding_failure(true);
    let outcome = p
        .indexer
        .add_or_update_note(1, 1, "Lyon is the capital of France")
        .await;
    assert!(matches!(
        outcome,
        IndexOutcome::Failed(IndexFailure::Embedding(_))
    ));
    assert!(!outcome.is_synchronized());
    p.backend.set_embedding_failure(false);

    // The stale record still carries the old content.
    let docs = p
        .retriever()
        .query_notes(1, "capital of France", None)
        .await
        .unwrap();
    assert!(docs[0].contains("Paris"));
}

#[tokio::test]
async fn test_storage_failure_classified_as_storage() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;

    p.store.set_storage_failure(true);
    let outcome = p
        .indexer
        .add_or_update_note(1, 2, "Berlin is the capital of Germany")
        .await;
    assert!(matches!(
        outcome,
        IndexOutcome::Failed(IndexFailure::Storage(_))
    ));
    assert!(!outcome.is_synchronized());
    p.store.set_storage_failure(false);

    // The earlier record is intact and note 2 was never written.
    assert_eq!(p.store.record_count(1), 1);
    let docs = p
        .retriever()
        .query_notes(1, "capital of France", None)
        .await
        .unwrap();
    assert!(docs[0].contains("Paris"));
}

#[tokio::test]
async fn test_remove_storage_failure_classified_as_storage() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;

    p.store.set_storage_failure(true);
    let outcome = p.indexer.remove_note(1, 1).await;
    assert!(matches!(
        outcome,
        IndexOutcome::Failed(IndexFailure::Storage(_))
    ));
    p.store.set_storage_failure(false);

    // The record survives the failed delete.
    assert_eq!(p.store.record_count(1), 1);
}

#[tokio::test]
async fn test_chat_answers_from_retrieved_context() {
    let p = Pipeline::new();

    p.indexer
        .add_or_update_note(1, 1, "Paris is the capital of France")
        .await;

    let backend = p
        .backend
        .clone()
        .with_fixed_response("Paris, according to your notes.");
    let chat = NoteChat::new(
        p.retriever(),
        Arc::new(backend) as Arc<dyn GenerationBackend>,
    );

    let answer = chat.ask(1, "What is the capital of France?").await.unwrap();
    assert_eq!(answer, "Paris, according to your notes.");
}

#[tokio::test]
async fn test_chat_short_circuits_without_context() {
    let p = Pipeline::new();
    let chat = p.chat();

    let answer = chat.ask(1, "What is the capital of France?").await.unwrap();

    assert_eq!(answer, NO_CONTEXT_ANSWER);
    assert_eq!(
        p.backend.generate_call_count(),
        0,
        "Generation must not run when retrieval is empty"
    );
}
