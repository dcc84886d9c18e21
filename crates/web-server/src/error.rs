use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DbError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Service is starting; database not ready")]
    Unavailable,
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Every request-time failure ends here: the process never crashes on a bad
/// request, it answers with a structured `{"error": ...}` body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Db(DbError::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found".to_string())
            }
            AppError::Db(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service is starting; database not ready".to_string(),
            ),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
