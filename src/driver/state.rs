//! Application State
//!
//! 依存性注入済みのユースケースをハンドラーで共有する

use std::sync::Arc;

use crate::adapter::config::Config;
use crate::adapter::html::HtmlDocumentLoader;
use crate::adapter::repositories::in_memory_session_repository::InMemorySessionRepository;
use crate::application::dto::analysis_config::AnalysisConfig;
use crate::application::use_cases::analyze_uploads::AnalyzeUploadsUseCase;
use crate::application::use_cases::export_session::ExportSessionUseCase;
use crate::application::use_cases::process_batch::ProcessBatchUseCase;

pub type AnalyzeUploads = AnalyzeUploadsUseCase<HtmlDocumentLoader, InMemorySessionRepository>;
pub type ExportSession = ExportSessionUseCase<InMemorySessionRepository>;

/// ハンドラー共有状態
#[derive(Clone)]
pub struct AppState {
    pub analyze: Arc<AnalyzeUploads>,
    pub export: Arc<ExportSession>,
}

impl AppState {
    /// 設定とセッションストアからユースケースを組み立てる
    ///
    /// # Arguments
    ///
    /// * `config` - サービス設定
    /// * `sessions` - セッションストア（スイーパーと共有する）
    pub fn new(config: &Config, sessions: Arc<InMemorySessionRepository>) -> Self {
        let loader = Arc::new(HtmlDocumentLoader::from(&config.loader));
        let process_batch =
            ProcessBatchUseCase::new(loader, AnalysisConfig::from(&config.analysis));

        Self {
            analyze: Arc::new(AnalyzeUploadsUseCase::new(
                process_batch,
                Arc::clone(&sessions),
            )),
            export: Arc::new(ExportSessionUseCase::new(sessions)),
        }
    }
}
