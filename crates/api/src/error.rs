use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use friends_core::error::CoreError;
use friends_store::StoreError;

use crate::response::MessageResponse;

/// Message returned for every missing record.
pub const NOT_FOUND_MESSAGE: &str = "Item not found";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`StoreError`] and implements [`IntoResponse`] so
/// every failure renders as a `{ "message": ... }` JSON body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `friends_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An error from the record store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Core(core) => classify_core_error(core),
            AppError::Store(err) => classify_core_error(err.into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, axum::Json(MessageResponse::new(message))).into_response()
    }
}

/// Map a domain error to an HTTP status and client-facing message.
///
/// Internal errors are logged and replaced by a generic message so storage
/// details (paths, parse errors) never reach the client.
fn classify_core_error(err: CoreError) -> (StatusCode, String) {
    match err {
        CoreError::NotFound { entity, id } => {
            tracing::debug!(entity, id, "Record not found");
            (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string())
        }
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            )
        }
    }
}
