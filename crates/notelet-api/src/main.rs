//! notelet HTTP API server.

mod error;
mod handlers;
mod state;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notelet_core::{defaults, EmbeddingBackend, GenerationBackend, VectorStore};
use notelet_db::Database;
use notelet_index::{NoteChat, NoteIndexer, NoteRetriever};
use notelet_inference::OllamaBackend;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

    let backend = Arc::new(OllamaBackend::from_env());
    let embed_dimension = EmbeddingBackend::dimension(backend.as_ref());
    info!(
        subsystem = "api",
        op = "startup",
        embed_model = EmbeddingBackend::model_name(backend.as_ref()),
        gen_model = GenerationBackend::model_name(backend.as_ref()),
        embed_dimension,
        "Inference backend configured"
    );

    let db = Database::connect(&database_url, embed_dimension).await?;
    db.migrate().await?;
    info!(subsystem = "api", op = "startup", "Database ready");

    let store: Arc<dyn VectorStore> = Arc::new(db.vectors.clone());
    let embedder: Arc<dyn EmbeddingBackend> = backend.clone();
    let generator: Arc<dyn GenerationBackend> = backend.clone();

    let indexer = Arc::new(NoteIndexer::new(store.clone(), embedder.clone()));
    let retriever = NoteRetriever::new(store, embedder);
    let chat = Arc::new(NoteChat::new(retriever, generator.clone()));

    let state = AppState {
        db,
        indexer,
        chat,
        generator,
        http: state::scrape_client()?,
    };

    let app = build_router(state);

    let addr = std::env::var("NOTELET_ADDR").unwrap_or_else(|_| defaults::API_ADDR.to_string());
    info!(subsystem = "api", op = "startup", %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route(
            "/api/v1/notes",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route(
            "/api/v1/notes/:id",
            put(handlers::notes::update_note).delete(handlers::notes::delete_note),
        )
        .route("/api/v1/notes/search", get(handlers::notes::search_notes))
        .route("/api/v1/notes/tags", get(handlers::notes::list_tags))
        .route("/api/v1/ai/summarize", post(handlers::ai::summarize))
        .route("/api/v1/ai/expand", post(handlers::ai::expand))
        .route(
            "/api/v1/ai/scrape-summarize",
            post(handlers::ai::scrape_summarize),
        )
        .route("/api/v1/ai/chat", post(handlers::ai::chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "notelet-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
