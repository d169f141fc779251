//! # Upload Response DTO
//!
//! アップロードAPIのレスポンス

use serde::Serialize;

use crate::domain::entities::batch::Batch;
use crate::domain::entities::extraction_result::ExtractionResult;

/// アップロード成功時のレスポンス
///
/// `{"ok": true, "result": [...], "session_id": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub result: Vec<ExtractionResult>,
    pub session_id: String,
}

impl From<&Batch> for UploadResponse {
    fn from(batch: &Batch) -> Self {
        Self {
            ok: true,
            result: batch.rows().to_vec(),
            session_id: batch.session_id().to_string(),
        }
    }
}
