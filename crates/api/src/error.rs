use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use roiview_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `roiview_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "ok": false,
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a core error into an HTTP status, error code, and message.
///
/// Dataset failures are logged in full (kind, attempted paths) and answered
/// with a generic message so file locations never reach the client.
fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::DatasetNotFound { candidates } => {
            tracing::error!(kind = err.kind(), ?candidates, "Annotation dataset not found");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "DATASET_UNAVAILABLE",
                "Annotation dataset is unavailable".to_string(),
            )
        }
        CoreError::KeyLength { .. }
        | CoreError::PayloadTooShort { .. }
        | CoreError::Decryption(_)
        | CoreError::DatasetInvalid(_) => {
            tracing::error!(kind = err.kind(), error = %err, "Annotation dataset unusable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATASET_UNUSABLE",
                "Annotation dataset could not be read".to_string(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
