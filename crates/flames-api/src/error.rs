use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use flames_db::StoreError;
use flames_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Note not found")]
    NotFound,

    /// Also used for unknown ids on unlock, so the two cases look the same.
    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Unauthorized => ApiError::IncorrectPassword,
            other => {
                error!("Note store failure: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, success) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::NotFound => (StatusCode::NOT_FOUND, None),
            ApiError::IncorrectPassword => (StatusCode::UNAUTHORIZED, Some(false)),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = ErrorResponse {
            success,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Run a blocking store call (SQLite + Argon2) off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}
