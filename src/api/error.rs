use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::error::{PlaylistError, StoreError, SyncError};

/// Error body returned by every handler.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub stage: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("{} failed: {}", self.stage, self.message);
        }
        let body = Json(json!({
            "error": self.message,
            "stage": self.stage,
        }));
        (self.status, body).into_response()
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        let status = match &err {
            SyncError::AuthFailure { .. }
            | SyncError::ExternalApi { .. }
            | SyncError::Transport { .. } => StatusCode::BAD_GATEWAY,
            SyncError::ReconciliationFailure { .. } => StatusCode::CONFLICT,
            SyncError::Store(e) => store_status(e),
        };
        ApiError {
            status,
            stage: err.stage(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError {
            status: store_status(&err),
            stage: "store",
            message: err.to_string(),
        }
    }
}

impl From<PlaylistError> for ApiError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::Store(e) => e.into(),
            other => ApiError {
                status: StatusCode::FORBIDDEN,
                stage: "playlist",
                message: other.to_string(),
            },
        }
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::DuplicateKey { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
