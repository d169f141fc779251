//! # Analysis Configuration DTO
//!
//! バッチ解析設定のData Transfer Object

use std::time::Duration;

use crate::domain::services::eps_extractor::ExtractorSettings;

/// バッチ解析設定
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// ファイル1件あたりの処理時間上限
    pub per_file_timeout: Duration,
    /// 同時に処理するファイル数の上限
    pub max_concurrent_files: usize,
    /// EPS 抽出設定
    pub extractor: ExtractorSettings,
}

impl AnalysisConfig {
    /// 新しい解析設定を作成します。
    ///
    /// `max_concurrent_files` に 0 を渡した場合は 1 として扱います。
    ///
    /// # 例
    ///
    /// ```
    /// use std::time::Duration;
    /// use filing_eps::application::dto::analysis_config::AnalysisConfig;
    /// use filing_eps::domain::services::eps_extractor::ExtractorSettings;
    ///
    /// let config = AnalysisConfig::new(Duration::from_secs(5), 2, ExtractorSettings::default());
    ///
    /// assert_eq!(config.per_file_timeout, Duration::from_secs(5));
    /// assert_eq!(config.max_concurrent_files, 2);
    /// ```
    pub fn new(
        per_file_timeout: Duration,
        max_concurrent_files: usize,
        extractor: ExtractorSettings,
    ) -> Self {
        Self {
            per_file_timeout,
            max_concurrent_files: max_concurrent_files.max(1),
            extractor,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), 4, ExtractorSettings::default())
    }
}
