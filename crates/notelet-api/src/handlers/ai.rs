//! AI handlers: summarization, expansion, webpage summarization, and
//! retrieval-grounded chat over the user's notes.

use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::info;

use notelet_core::defaults;

use crate::error::ApiError;
use crate::state::{authenticate, AppState};

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeBody {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub query: String,
}

/// POST /api/v1/ai/summarize
pub async fn summarize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TextBody>,
) -> Result<impl IntoResponse, ApiError> {
    authenticate(&state, &headers).await?;
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }

    let prompt = format!(
        "Please provide a concise, bullet-point summary of the following text:\n\n---\n\n{}",
        body.text
    );
    let summary = state.generator.generate(&prompt).await?;

    Ok(Json(serde_json::json!({ "summary": summary })))
}

/// POST /api/v1/ai/expand
pub async fn expand(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<TextBody>,
) -> Result<impl IntoResponse, ApiError> {
    authenticate(&state, &headers).await?;
    if body.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }

    let prompt = format!(
        "You are a professional content writer. Expand the following idea or bullet points \
         into a well-written, coherent paragraph:\n\n---\n\n{}",
        body.text
    );
    let expanded = state.generator.generate(&prompt).await?;

    Ok(Json(serde_json::json!({ "expanded_text": expanded })))
}

/// POST /api/v1/ai/scrape-summarize
pub async fn scrape_summarize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ScrapeBody>,
) -> Result<impl IntoResponse, ApiError> {
    authenticate(&state, &headers).await?;
    if body.url.trim().is_empty() {
        return Err(ApiError::BadRequest("URL is required".to_string()));
    }

    let response = state
        .http
        .get(&body.url)
        .timeout(Duration::from_secs(defaults::SCRAPE_TIMEOUT_SECS))
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| ApiError::BadRequest(format!("Failed to fetch URL: {}", e)))?;

    let html = response
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read page body: {}", e)))?;

    let article = extract_paragraph_text(&html);
    if article.is_empty() {
        return Err(ApiError::BadRequest(
            "No readable paragraph content found at URL".to_string(),
        ));
    }

    info!(
        subsystem = "api",
        component = "ai",
        op = "scrape_summarize",
        url = %body.url,
        article_chars = article.len(),
        "Page scraped, summarizing"
    );

    let prompt = format!(
        "Please provide a concise, high-quality summary of the following article \
         text:\n\n---\n\n{}",
        article
    );
    let summary = state.generator.generate(&prompt).await?;

    Ok(Json(serde_json::json!({ "summary": summary })))
}

/// POST /api/v1/ai/chat
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ChatBody>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;
    if body.query.trim().is_empty() {
        return Err(ApiError::BadRequest("A query is required".to_string()));
    }

    let answer = state.chat.ask(owner_id, &body.query).await?;
    Ok(Json(serde_json::json!({ "answer": answer })))
}

/// Extract and join the text of all `<p>` elements.
///
/// Kept synchronous so the parsed DOM never lives across an await point.
fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = Selector::parse("p").expect("static selector");

    document
        .select(&selector)
        .map(|p| p.text().collect::<String>())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_paragraph_text() {
        let html = "<html><body>\
            <nav>menu</nav>\
            <p>First paragraph.</p>\
            <script>var x = 1;</script>\
            <p>  Second paragraph. </p>\
            <p></p>\
            </body></html>";

        let text = extract_paragraph_text(html);
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_extract_paragraph_text_no_paragraphs() {
        assert_eq!(extract_paragraph_text("<div>no paragraphs</div>"), "");
    }
}
