use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use dashboard_store::StoreError;
use serde_json::json;

/// Request-scoped failure, mapped onto the response status. Nothing here is
/// fatal to the process.
pub enum AppError {
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            AppError::Conflict(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Internal(error) => {
                tracing::error!(error = %error, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(error)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::AlreadyInWatchlist => {
                AppError::Conflict("Stock already in watchlist".to_string())
            }
            StoreError::NotInWatchlist => AppError::NotFound("Stock not in watchlist".to_string()),
            StoreError::Database(e) => AppError::Internal(e.into()),
        }
    }
}
