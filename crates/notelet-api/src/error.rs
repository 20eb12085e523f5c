//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use sqlx::error::DatabaseError;

use notelet_core::Error;

/// Errors surfaced to API clients.
#[derive(Debug)]
pub enum ApiError {
    Internal(Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    UpstreamFailed(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            Error::NoteNotFound(id) => ApiError::NotFound(format!("Note {} not found", id)),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            Error::Embedding(msg) | Error::Inference(msg) => {
                ApiError::UpstreamFailed(msg.clone())
            }
            Error::Database(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                let msg = match db_err.constraint() {
                    Some("account_username_key") => "Username already exists".to_string(),
                    Some(constraint) => format!("Duplicate value for {}", constraint),
                    None => "Duplicate value".to_string(),
                };
                ApiError::Conflict(msg)
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                tracing::error!(error = %err, "Internal API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        let body = Json(serde_json::json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct UniqueViolation {
        constraint: &'static str,
    }

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(
                f,
                "duplicate key value violates unique constraint \"{}\"",
                self.constraint
            )
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some("23505".into())
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    fn unique_violation(constraint: &'static str) -> Error {
        Error::Database(sqlx::Error::Database(Box::new(UniqueViolation {
            constraint,
        })))
    }

    #[test]
    fn test_username_unique_violation_maps_to_conflict() {
        let api_err: ApiError = unique_violation("account_username_key").into();
        match api_err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Username already exists"),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_other_unique_violation_names_its_constraint() {
        let api_err: ApiError = unique_violation("collection_name_key").into();
        match api_err {
            ApiError::Conflict(msg) => assert!(msg.contains("collection_name_key")),
            other => panic!("Expected Conflict, got {:?}", other),
        }
    }

    #[test]
    fn test_non_unique_database_error_maps_to_internal() {
        let api_err: ApiError = Error::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(api_err, ApiError::Internal(_)));
    }

    #[test]
    fn test_note_not_found_maps_to_404() {
        let api_err: ApiError = Error::NoteNotFound(7).into();
        assert!(matches!(api_err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let api_err: ApiError = Error::InvalidInput("bad".to_string()).into();
        assert!(matches!(api_err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_inference_maps_to_upstream() {
        let api_err: ApiError = Error::Inference("model down".to_string()).into();
        assert!(matches!(api_err, ApiError::UpstreamFailed(_)));
    }
}
