//! Note CRUD, search, and tag handlers.
//!
//! Mutations commit to the primary store first and then synchronize the
//! embedding index best-effort. A degraded index never fails the request.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use notelet_core::{CreateNoteRequest, NoteRepository, UpdateNoteRequest};
use notelet_index::IndexOutcome;

use crate::error::ApiError;
use crate::state::{authenticate, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateNoteBody {
    pub title: Option<String>,
    pub content: String,
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteBody {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

fn log_unsynchronized(op: &str, owner_id: i64, note_id: i64, outcome: &IndexOutcome) {
    if let IndexOutcome::Failed(failure) = outcome {
        warn!(
            subsystem = "api",
            component = "notes",
            op,
            owner_id,
            note_id,
            failure = ?failure,
            "Note saved but index synchronization failed"
        );
    }
}

/// GET /api/v1/notes
pub async fn list_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;
    let notes = state.db.notes.list(owner_id, query.tag.as_deref()).await?;
    Ok(Json(notes))
}

/// POST /api/v1/notes
pub async fn create_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;

    let note_id = state
        .db
        .notes
        .insert(
            owner_id,
            CreateNoteRequest {
                title: body.title,
                content: body.content.clone(),
                tags: body.tags,
            },
        )
        .await?;

    let outcome = state
        .indexer
        .add_or_update_note(owner_id, note_id, &body.content)
        .await;
    log_unsynchronized("create", owner_id, note_id, &outcome);

    let note = state.db.notes.fetch(owner_id, note_id).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /api/v1/notes/:id
pub async fn update_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(note_id): Path<i64>,
    Json(body): Json<UpdateNoteBody>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;

    state
        .db
        .notes
        .update(
            owner_id,
            note_id,
            UpdateNoteRequest {
                title: body.title,
                content: body.content.clone(),
                tags: body.tags,
            },
        )
        .await?;

    let outcome = state
        .indexer
        .add_or_update_note(owner_id, note_id, &body.content)
        .await;
    log_unsynchronized("update", owner_id, note_id, &outcome);

    let note = state.db.notes.fetch(owner_id, note_id).await?;
    Ok(Json(note))
}

/// DELETE /api/v1/notes/:id
pub async fn delete_note(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(note_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;

    state.db.notes.delete(owner_id, note_id).await?;

    let outcome = state.indexer.remove_note(owner_id, note_id).await;
    log_unsynchronized("delete", owner_id, note_id, &outcome);

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/notes/search?q=
pub async fn search_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;
    let notes = state.db.notes.search(owner_id, &query.q).await?;
    Ok(Json(notes))
}

/// GET /api/v1/notes/tags
pub async fn list_tags(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = authenticate(&state, &headers).await?;
    let tags = state.db.notes.all_tags(owner_id).await?;
    Ok(Json(tags))
}
