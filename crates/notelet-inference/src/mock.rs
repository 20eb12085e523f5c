//! Mock inference backend for deterministic testing.
//!
//! Provides a mock implementation of both inference traits that generates
//! deterministic embeddings and canned responses. Embeddings are hashed
//! bag-of-words vectors, so texts sharing words land near each other under
//! cosine distance — close enough to semantic similarity for retrieval tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use notelet_core::{EmbeddingBackend, Error, GenerationBackend, Result};

/// Mock inference backend for testing.
#[derive(Clone)]
pub struct MockInferenceBackend {
    dimension: usize,
    default_response: String,
    fixed_responses: HashMap<String, String>,
    fail_embeddings: Arc<AtomicBool>,
    fail_generation: Arc<AtomicBool>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

/// A logged call for assertion in tests.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub input: String,
}

impl MockInferenceBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            dimension: 384,
            default_response: "Mock response".to_string(),
            fixed_responses: HashMap::new(),
            fail_embeddings: Arc::new(AtomicBool::new(false)),
            fail_generation: Arc::new(AtomicBool::new(false)),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the embedding dimension.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    /// Set the default response for generation requests.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Add a response mapping for a specific prompt.
    pub fn with_response_mapping(
        mut self,
        prompt: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.fixed_responses.insert(prompt.into(), output.into());
        self
    }

    /// Toggle embedding failure at runtime (shared with clones).
    pub fn set_embedding_failure(&self, fail: bool) {
        self.fail_embeddings.store(fail, Ordering::SeqCst);
    }

    /// Toggle generation failure at runtime (shared with clones).
    pub fn set_generation_failure(&self, fail: bool) {
        self.fail_generation.store(fail, Ordering::SeqCst);
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Number of embedding calls made (document or query mode).
    pub fn embed_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation.starts_with("embed"))
            .count()
    }

    /// Number of generation calls made.
    pub fn generate_call_count(&self) -> usize {
        self.call_log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.operation == "generate")
            .count()
    }

    fn log_call(&self, operation: &str, input: &str) {
        self.call_log.lock().unwrap().push(MockCall {
            operation: operation.to_string(),
            input: input.to_string(),
        });
    }

    /// Deterministic bag-of-words embedding.
    ///
    /// Each lowercase word hashes into a bucket; the count vector is then
    /// normalized. Word overlap between texts yields cosine similarity.
    pub fn embed_text(text: &str, dimension: usize) -> Vec<f32> {
        let mut vec = vec![0.0f32; dimension];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hash: u64 = 0xcbf29ce484222325;
            for b in word.to_lowercase().bytes() {
                hash ^= b as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vec[(hash % dimension as u64) as usize] += 1.0;
        }

        normalize(&mut vec);
        vec
    }
}

impl Default for MockInferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(vec: &mut [f32]) {
    let magnitude: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vec.iter_mut().for_each(|x| *x /= magnitude);
    }
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a > 0.0 && mag_b > 0.0 {
        dot / (mag_a * mag_b)
    } else {
        0.0
    }
}

#[async_trait]
impl EmbeddingBackend for MockInferenceBackend {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        for text in texts {
            self.log_call("embed_documents", text);
        }
        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(Error::Embedding("simulated provider failure".to_string()));
        }
        Ok(texts
            .iter()
            .map(|t| Self::embed_text(t, self.dimension))
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.log_call("embed_query", text);
        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(Error::Embedding("simulated provider failure".to_string()));
        }
        Ok(Self::embed_text(text, self.dimension))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "mock-embed"
    }
}

#[async_trait]
impl GenerationBackend for MockInferenceBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.log_call("generate", prompt);
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(Error::Inference("simulated provider failure".to_string()));
        }
        if let Some(response) = self.fixed_responses.get(prompt) {
            return Ok(response.clone());
        }
        Ok(self.default_response.clone())
    }

    async fn generate_with_system(&self, _system: &str, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }

    fn model_name(&self) -> &str {
        "mock-gen"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embed_deterministic() {
        let backend = MockInferenceBackend::new();

        let e1 = backend.embed_query("quantum computing").await.unwrap();
        let e2 = backend.embed_query("quantum computing").await.unwrap();

        assert_eq!(e1, e2, "Embeddings should be deterministic");
    }

    #[tokio::test]
    async fn test_embed_dimension() {
        let backend = MockInferenceBackend::new().with_dimension(128);
        let embedding = backend.embed_query("test").await.unwrap();
        assert_eq!(embedding.len(), 128);
    }

    #[test]
    fn test_embedding_normalized() {
        let embedding = MockInferenceBackend::embed_text("some test text", 128);
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.01, "Should be normalized");
    }

    #[test]
    fn test_word_overlap_similarity() {
        let dim = 384;
        let a = MockInferenceBackend::embed_text("Paris is the capital of France", dim);
        let b = MockInferenceBackend::embed_text("what is the capital of France", dim);
        let c = MockInferenceBackend::embed_text("mitochondria powerhouse cell", dim);

        assert!(
            cosine_similarity(&a, &b) > cosine_similarity(&a, &c),
            "Shared words should rank nearer than disjoint words"
        );
    }

    #[test]
    fn test_embedding_case_insensitive() {
        let a = MockInferenceBackend::embed_text("Paris", 128);
        let b = MockInferenceBackend::embed_text("paris", 128);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_generate_response_mapping() {
        let backend = MockInferenceBackend::new()
            .with_response_mapping("hello", "world")
            .with_fixed_response("fallback");

        assert_eq!(backend.generate("hello").await.unwrap(), "world");
        assert_eq!(backend.generate("other").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let backend = MockInferenceBackend::new();
        backend.set_embedding_failure(true);

        let result = backend.embed_query("test").await;
        assert!(matches!(result, Err(Error::Embedding(_))));

        backend.set_embedding_failure(false);
        assert!(backend.embed_query("test").await.is_ok());
    }

    #[tokio::test]
    async fn test_call_logging() {
        let backend = MockInferenceBackend::new();

        backend
            .embed_documents(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        backend.embed_query("q").await.unwrap();
        backend.generate("prompt").await.unwrap();

        assert_eq!(backend.embed_call_count(), 3);
        assert_eq!(backend.generate_call_count(), 1);
    }
}
