use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Business failures in the pipeline are folded into 200 responses by the
/// handlers, so this type only covers dependencies that never came up at
/// startup and genuinely unexpected errors.
pub enum AppError {
    /// A required dependency failed to initialize at startup.
    ServiceUnavailable(String),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::ServiceUnavailable(msg) => {
                error!("Service unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
