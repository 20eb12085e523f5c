//! Compiled defaults for notelet.
//!
//! Environment variables override these at startup; nothing below is read
//! from the environment directly.

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const EMBED_MODEL: &str = "nomic-embed-text";

/// Default generation model.
pub const GEN_MODEL: &str = "qwen3:8b";

/// Embedding dimension for the default embedding model.
pub const EMBED_DIMENSION: usize = 768;

/// Timeout for embedding requests (seconds).
pub const EMBED_TIMEOUT_SECS: u64 = 120;

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 300;

/// Timeout for outbound webpage fetches (seconds).
pub const SCRAPE_TIMEOUT_SECS: u64 = 10;

/// User-Agent sent on outbound webpage fetches. Many sites refuse the bare
/// library default.
pub const SCRAPE_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default number of documents returned by a retrieval query.
pub const DEFAULT_TOP_K: usize = 3;

/// Prefix applied to texts embedded in document mode (nomic-style asymmetry).
pub const DOCUMENT_PREFIX: &str = "search_document: ";

/// Prefix applied to texts embedded in query mode.
pub const QUERY_PREFIX: &str = "search_query: ";

/// Number of leading words kept when deriving a note summary.
pub const SUMMARY_WORDS: usize = 15;

/// Session token lifetime (hours).
pub const SESSION_TTL_HOURS: i64 = 168;

/// Default HTTP bind address for the API server.
pub const API_ADDR: &str = "0.0.0.0:8080";
