//! Error Responses
//!
//! HTTPエラーレスポンス（常に `{"ok": false, "error": "..."}`）

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::{error, info};
use serde_json::json;
use thiserror::Error;

use crate::application::use_cases::analyze_uploads::AnalyzeError;
use crate::domain::errors::{BatchError, SessionError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid upload: {0}")]
    BadRequest(String),

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::Batch(BatchError::EmptyBatch) => Self::NoFile,
            AnalyzeError::Store(e) => Self::Internal(format!("{:#}", e)),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        info!("Download rejected: {}", err);
        Self::SessionNotFound
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NoFile | Self::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::SessionNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            Self::Internal(_) => {
                error!("{}", self);
                (
                    StatusCode::OK,
                    "An internal error occurred while processing the upload".to_string(),
                )
            }
        };

        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}
