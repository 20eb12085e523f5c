//! # notelet-core
//!
//! Core types, traits, and abstractions for the notelet note backend.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other notelet crates depend on: the error taxonomy, the note and
//! collection models, and the seams between the primary store, the vector
//! index, and the inference backends.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
