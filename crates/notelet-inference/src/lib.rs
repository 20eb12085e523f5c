//! # notelet-inference
//!
//! Inference backends for notelet: the Embedding Provider and Generation
//! Consumer behind the [`notelet_core::EmbeddingBackend`] and
//! [`notelet_core::GenerationBackend`] traits.
//!
//! Production deployments use [`OllamaBackend`]; tests use the deterministic
//! [`mock::MockInferenceBackend`] (feature `mock`).

pub mod ollama;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use ollama::OllamaBackend;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockInferenceBackend;
