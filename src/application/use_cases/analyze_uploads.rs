//! # Analyze Uploads Use Case
//!
//! アップロードされたファイル群を解析し、結果をセッションとして登録するユースケース

use std::sync::Arc;

use log::info;
use thiserror::Error;

use crate::application::use_cases::process_batch::ProcessBatchUseCase;
use crate::domain::entities::batch::Batch;
use crate::domain::entities::uploaded_file::UploadedFile;
use crate::domain::errors::BatchError;
use crate::domain::repositories::document_loader::DocumentLoader;
use crate::domain::repositories::session_repository::SessionRepository;

/// 解析ユースケースのエラー
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// クライアント入力に起因するエラー
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// セッション登録の失敗
    #[error("failed to store session: {0}")]
    Store(anyhow::Error),
}

/// アップロード解析ユースケース
pub struct AnalyzeUploadsUseCase<L: DocumentLoader + 'static, S: SessionRepository> {
    process_batch: ProcessBatchUseCase<L>,
    session_repository: Arc<S>,
}

impl<L: DocumentLoader + 'static, S: SessionRepository> AnalyzeUploadsUseCase<L, S> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `process_batch` - バッチ抽出ユースケース
    /// * `session_repository` - セッションリポジトリ
    pub fn new(process_batch: ProcessBatchUseCase<L>, session_repository: Arc<S>) -> Self {
        Self {
            process_batch,
            session_repository,
        }
    }

    /// ファイルを解析してセッションに登録
    ///
    /// # Arguments
    ///
    /// * `files` - アップロード順のファイル
    ///
    /// # Returns
    ///
    /// セッションIDが割り当てられたバッチ
    ///
    /// # Errors
    ///
    /// - ファイルが1つもない場合: `AnalyzeError::Batch`
    /// - セッション登録に失敗した場合: `AnalyzeError::Store`
    pub async fn execute(&self, files: Vec<UploadedFile>) -> Result<Arc<Batch>, AnalyzeError> {
        let file_count = files.len();
        let rows = self.process_batch.execute(files).await?;

        let batch = self
            .session_repository
            .create(rows)
            .await
            .map_err(AnalyzeError::Store)?;

        info!(
            "Session {} created: {}/{} files with EPS",
            batch.session_id(),
            batch.found_count(),
            file_count
        );
        Ok(batch)
    }
}
