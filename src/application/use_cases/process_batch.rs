//! # Process Batch Use Case
//!
//! アップロードされたファイル群から EPS を抽出するユースケース
//!
//! ファイルごとにブロッキングスレッドで「読み込み → 抽出」を行い、
//! 読み込みエラー・タイムアウト・パニックはその行の警告として扱う。
//! 同時実行数の許可はブロッキング処理が終わるまで保持するため、
//! タイムアウトで見捨てた処理もバッチをまたいで上限に数えられる。

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::application::dto::analysis_config::AnalysisConfig;
use crate::domain::entities::extraction_result::ExtractionResult;
use crate::domain::entities::uploaded_file::UploadedFile;
use crate::domain::errors::BatchError;
use crate::domain::repositories::document_loader::DocumentLoader;
use crate::domain::services::eps_extractor::EpsExtractor;

/// パニック時に返す警告
const INTERNAL_ERROR_WARNING: &str = "internal error while processing file";

/// バッチ抽出ユースケース
pub struct ProcessBatchUseCase<L: DocumentLoader + 'static> {
    loader: Arc<L>,
    extractor: Arc<EpsExtractor>,
    permits: Arc<Semaphore>,
    config: AnalysisConfig,
}

impl<L: DocumentLoader + 'static> ProcessBatchUseCase<L> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `loader` - ドキュメントローダー
    /// * `config` - 解析設定（抽出設定を含む）
    pub fn new(loader: Arc<L>, config: AnalysisConfig) -> Self {
        let extractor = Arc::new(EpsExtractor::new(config.extractor.clone()));
        let permits = Arc::new(Semaphore::new(config.max_concurrent_files));
        Self {
            loader,
            extractor,
            permits,
            config,
        }
    }

    /// 全ファイルを処理する
    ///
    /// # Arguments
    ///
    /// * `files` - アップロード順のファイル
    ///
    /// # Returns
    ///
    /// 入力と同じ長さ・同じ順序の抽出結果
    ///
    /// # Errors
    ///
    /// ファイルが1つもない場合に `BatchError::EmptyBatch` を返す
    pub async fn execute(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<Vec<ExtractionResult>, BatchError> {
        if files.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let timeout = self.config.per_file_timeout;
        let filenames: Vec<String> = files.iter().map(|f| f.filename.clone()).collect();
        let mut tasks = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            let loader = Arc::clone(&self.loader);
            let extractor = Arc::clone(&self.extractor);
            let permits = Arc::clone(&self.permits);

            tasks.spawn(async move {
                let permit = permits.acquire_owned().await.ok();
                let filename = file.filename.clone();
                let work = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    analyze_file(loader.as_ref(), &extractor, &file)
                });

                let row = match tokio::time::timeout(timeout, work).await {
                    Ok(Ok(row)) => row,
                    Ok(Err(e)) => {
                        warn!("Analysis of {} failed: {}", filename, e);
                        ExtractionResult::failed(filename, INTERNAL_ERROR_WARNING)
                    }
                    Err(_) => {
                        warn!(
                            "Analysis of {} timed out after {}ms",
                            filename,
                            timeout.as_millis()
                        );
                        ExtractionResult::failed(
                            filename,
                            format!("extraction timed out after {}ms", timeout.as_millis()),
                        )
                    }
                };
                (index, row)
            });
        }

        let mut slots: Vec<Option<ExtractionResult>> = vec![None; filenames.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, row)) => slots[index] = Some(row),
                Err(e) => warn!("Analysis task aborted: {}", e),
            }
        }

        Ok(slots
            .into_iter()
            .zip(filenames)
            .map(|(slot, filename)| {
                slot.unwrap_or_else(|| ExtractionResult::failed(filename, INTERNAL_ERROR_WARNING))
            })
            .collect())
    }
}

/// ファイル1件を読み込んで抽出する
fn analyze_file<L: DocumentLoader + ?Sized>(
    loader: &L,
    extractor: &EpsExtractor,
    file: &UploadedFile,
) -> ExtractionResult {
    let doc = match loader.load(&file.bytes, &file.filename) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Failed to load {}: {}", file.filename, e);
            return ExtractionResult::failed(&file.filename, e.to_string());
        }
    };

    let outcome = extractor.extract(&doc);
    debug!(
        "{}: {} blocks, outcome {:?}",
        file.filename,
        doc.blocks.len(),
        outcome
    );
    if let Some(warning) = outcome.warning() {
        warn!("{}: {}", file.filename, warning);
    }
    outcome.into_result(&file.filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::entities::parsed_document::{ParsedDocument, TextBlock};
    use crate::domain::errors::DocumentError;
    use crate::domain::repositories::document_loader::MockDocumentLoader;
    use crate::domain::services::eps_extractor::ExtractorSettings;

    /// ファイル内容をそのまま1つのテキストブロックにするローダー
    ///
    /// `panic` で始まる内容はパニック、`sleep` で始まる内容は長時間ブロックする
    struct PlainTextLoader;

    impl DocumentLoader for PlainTextLoader {
        fn load(&self, bytes: &[u8], filename: &str) -> Result<ParsedDocument, DocumentError> {
            let text = String::from_utf8_lossy(bytes).to_string();
            if text.is_empty() {
                return Err(DocumentError::EmptyInput {
                    filename: filename.to_string(),
                });
            }
            if text.starts_with("panic") {
                panic!("loader exploded");
            }
            if text.starts_with("sleep") {
                std::thread::sleep(Duration::from_millis(500));
            }
            Ok(ParsedDocument::new(filename, vec![TextBlock::text(text)]))
        }
    }

    fn use_case(timeout: Duration) -> ProcessBatchUseCase<PlainTextLoader> {
        ProcessBatchUseCase::new(
            Arc::new(PlainTextLoader),
            AnalysisConfig::new(timeout, 2, ExtractorSettings::default()),
        )
    }

    fn file(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_execute_empty_batch() {
        let result = use_case(Duration::from_secs(5)).execute(vec![]).await;
        assert_eq!(result, Err(BatchError::EmptyBatch));
    }

    #[tokio::test]
    async fn test_execute_preserves_order() {
        let files = vec![
            file("c.html", "Diluted EPS $0.30"),
            file("a.html", "Diluted EPS $0.10"),
            file("b.html", "Diluted EPS $0.20"),
            file("d.html", "Diluted EPS $0.40"),
            file("e.html", "Diluted EPS $0.50"),
        ];

        let rows = use_case(Duration::from_secs(5)).execute(files).await.unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["c.html", "a.html", "b.html", "d.html", "e.html"]);
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.eps).collect();
        assert_eq!(
            values,
            vec![Some(0.30), Some(0.10), Some(0.20), Some(0.40), Some(0.50)]
        );
    }

    #[tokio::test]
    async fn test_execute_isolates_load_errors() {
        let files = vec![
            file("empty.html", ""),
            file("ok.html", "EPS (0.45)"),
            file("none.html", "No figures here"),
        ];

        let rows = use_case(Duration::from_secs(5)).execute(files).await.unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].eps, None);
        assert_eq!(rows[0].warning.as_deref(), Some("empty.html: file is empty"));
        assert_eq!(rows[1].eps, Some(-0.45));
        assert_eq!(rows[2].eps, None);
        assert_eq!(rows[2].warning.as_deref(), Some("EPS not found"));
    }

    #[tokio::test]
    async fn test_execute_isolates_panics() {
        let files = vec![file("bad.html", "panic now"), file("good.html", "EPS $1.50")];

        let rows = use_case(Duration::from_secs(5)).execute(files).await.unwrap();

        assert_eq!(rows[0].eps, None);
        assert_eq!(rows[0].warning.as_deref(), Some(INTERNAL_ERROR_WARNING));
        assert_eq!(rows[1].eps, Some(1.50));
    }

    #[tokio::test]
    async fn test_execute_times_out_slow_files() {
        let files = vec![
            file("slow.html", "sleep then EPS $1.00"),
            file("fast.html", "EPS $2.00"),
        ];

        let rows = use_case(Duration::from_millis(50))
            .execute(files)
            .await
            .unwrap();

        assert_eq!(rows[0].eps, None);
        assert_eq!(
            rows[0].warning.as_deref(),
            Some("extraction timed out after 50ms")
        );
        assert_eq!(rows[1].eps, Some(2.00));
    }

    #[tokio::test]
    async fn test_timed_out_work_keeps_its_permit_until_done() {
        let use_case = ProcessBatchUseCase::new(
            Arc::new(PlainTextLoader),
            AnalysisConfig::new(Duration::from_millis(50), 1, ExtractorSettings::default()),
        );

        let rows = use_case
            .execute(vec![file("slow.html", "sleep then EPS $1.00")])
            .await
            .unwrap();
        assert_eq!(rows[0].eps, None);
        assert_eq!(use_case.permits.available_permits(), 0);

        tokio::time::sleep(Duration::from_millis(800)).await;
        assert_eq!(use_case.permits.available_permits(), 1);

        let rows = use_case
            .execute(vec![file("fast.html", "EPS $2.00")])
            .await
            .unwrap();
        assert_eq!(rows[0].eps, Some(2.00));
    }

    #[tokio::test]
    async fn test_execute_passes_filename_to_loader() {
        let mut loader = MockDocumentLoader::new();
        loader
            .expect_load()
            .withf(|bytes, filename| {
                bytes.to_vec() == b"<p>x</p>".to_vec() && filename.to_string() == "q3.htm"
            })
            .times(1)
            .returning(|_, filename| {
                Ok(ParsedDocument::new(
                    filename,
                    vec![TextBlock::text("Basic EPS $0.77")],
                ))
            });

        let use_case = ProcessBatchUseCase::new(Arc::new(loader), AnalysisConfig::default());
        let rows = use_case
            .execute(vec![file("q3.htm", "<p>x</p>")])
            .await
            .unwrap();

        assert_eq!(rows, vec![ExtractionResult::found("q3.htm", 0.77)]);
    }
}
