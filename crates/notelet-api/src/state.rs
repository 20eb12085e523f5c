//! Shared application state and request authentication.

use std::sync::Arc;

use axum::http::HeaderMap;

use notelet_core::{defaults, GenerationBackend};
use notelet_db::Database;
use notelet_index::{NoteChat, NoteIndexer};

use crate::error::ApiError;

/// Shared state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub indexer: Arc<NoteIndexer>,
    pub chat: Arc<NoteChat>,
    pub generator: Arc<dyn GenerationBackend>,
    /// Client for fetching external pages to summarize.
    pub http: reqwest::Client,
}

/// Client for outbound page fetches. Sends a browser User-Agent; sites
/// commonly reject the bare library default with 403.
pub fn scrape_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(defaults::SCRAPE_USER_AGENT)
        .build()
}

/// Resolve the bearer token in `Authorization` to a user id.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<i64, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    state
        .db
        .users
        .resolve_session(token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrape_client_uses_browser_user_agent() {
        assert!(defaults::SCRAPE_USER_AGENT.starts_with("Mozilla/5.0"));
        assert!(scrape_client().is_ok());
    }
}
