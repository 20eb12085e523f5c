//! Registration and login handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.users.create(&req.username, &req.password).await?;
    let token = state.db.users.create_session(user.id).await?;

    info!(
        subsystem = "api",
        component = "auth",
        op = "register",
        user_id = user.id,
        "User registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "token": token,
            "user": { "id": user.id, "username": user.username },
        })),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users
        .find_by_username(&req.username)
        .await?
        .filter(|user| notelet_db::PgUserRepository::verify_password(user, &req.password))
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let token = state.db.users.create_session(user.id).await?;

    info!(
        subsystem = "api",
        component = "auth",
        op = "login",
        user_id = user.id,
        "User logged in"
    );

    Ok(Json(serde_json::json!({
        "token": token,
        "user": { "id": user.id, "username": user.username },
    })))
}
