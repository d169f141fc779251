//! # Export Session Use Case
//!
//! セッションの抽出結果を CSV として出力するユースケース

use std::sync::Arc;

use log::info;

use crate::domain::errors::SessionError;
use crate::domain::repositories::session_repository::SessionRepository;
use crate::domain::services::csv_renderer::CsvRenderer;

/// CSV 出力ユースケース
pub struct ExportSessionUseCase<S: SessionRepository> {
    session_repository: Arc<S>,
}

impl<S: SessionRepository> ExportSessionUseCase<S> {
    pub fn new(session_repository: Arc<S>) -> Self {
        Self { session_repository }
    }

    /// セッションの結果を CSV バイト列にする
    ///
    /// # Errors
    ///
    /// セッションが存在しない・期限切れの場合に `SessionError` を返す
    pub async fn execute(&self, session_id: &str) -> Result<Vec<u8>, SessionError> {
        let batch = self.session_repository.get(session_id).await?;
        let csv = CsvRenderer::render(&batch);
        info!(
            "Exported session {}: {} rows, {} bytes",
            session_id,
            batch.len(),
            csv.len()
        );
        Ok(csv)
    }
}
