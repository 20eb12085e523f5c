//! Core data models for notelet.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2id PHC string. Never serialized to API responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A note row as stored in the primary store.
///
/// The primary store owns this record; the embedding index only holds a
/// derived, disposable copy of `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Assigned by the primary store at creation (BIGSERIAL).
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    /// Source of truth for the embedding index.
    pub content: String,
    /// Derived preview: the first few words of the content.
    pub summary: String,
    /// Comma-delimited tag list.
    pub tags: String,
    pub created_at: DateTime<Utc>,
}

/// A per-user named container of embedding records in the vector store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: Uuid,
    pub owner_id: i64,
    pub name: String,
}

/// A document returned by a similarity query, nearest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Embedding record id (the note id rendered as a string).
    pub id: String,
    /// Verbatim note content at the time of embedding.
    pub document: String,
    /// Cosine distance to the query vector (smaller is nearer).
    pub distance: f32,
}

/// Derive the deterministic collection name for a user.
///
/// Collection naming is a pure function of the owner id; no two users ever
/// share a collection.
pub fn collection_name(owner_id: i64) -> String {
    format!("user_{}_notes", owner_id)
}

/// Derive the stored summary for a note: the first [`defaults::SUMMARY_WORDS`]
/// words of the content followed by an ellipsis.
pub fn derive_summary(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.len() <= defaults::SUMMARY_WORDS {
        return words.join(" ");
    }
    format!("{}...", words[..defaults::SUMMARY_WORDS].join(" "))
}

/// Split a comma-delimited tag string into trimmed, non-empty tags.
pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
