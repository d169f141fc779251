//! # Configuration
//!
//! サービス設定（JSONファイル）の読み込み
//!
//! 全項目にデフォルト値があり、ファイルに書かれた項目だけが上書きされる。
//!
//! ```json
//! {
//!   "server": { "bind": "0.0.0.0:5050", "allowed_origins": ["http://localhost:3000"] },
//!   "session": { "ttl_secs": 1800, "max_sessions": 50 },
//!   "analysis": { "per_file_timeout_ms": 5000, "extractor": { "max_abs_eps": 500.0 } },
//!   "loader": { "require_html_extension": true }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::application::dto::analysis_config::AnalysisConfig;
use crate::domain::services::eps_extractor::ExtractorSettings;

/// サービス全体の設定
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub analysis: AnalysisSettings,
    pub loader: LoaderConfig,
}

/// HTTPサーバー設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 待ち受けアドレス
    pub bind: String,
    /// CORS で許可するオリジン（空なら全て許可）
    pub allowed_origins: Vec<String>,
    /// リクエストボディの上限（バイト）
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5050".to_string(),
            allowed_origins: Vec::new(),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// セッションストア設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub max_sessions: usize,
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            max_sessions: 100,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 解析設定
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub per_file_timeout_ms: u64,
    pub max_concurrent_files: usize,
    pub extractor: ExtractorSettings,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            per_file_timeout_ms: 10_000,
            max_concurrent_files: 4,
            extractor: ExtractorSettings::default(),
        }
    }
}

impl From<&AnalysisSettings> for AnalysisConfig {
    fn from(settings: &AnalysisSettings) -> Self {
        AnalysisConfig::new(
            Duration::from_millis(settings.per_file_timeout_ms),
            settings.max_concurrent_files,
            settings.extractor.clone(),
        )
    }
}

/// ドキュメントローダー設定
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// `.htm` / `.html` / `.xhtml` 以外のファイル名を拒否する
    pub require_html_extension: bool,
}

impl Config {
    /// 設定ファイルを読み込む
    ///
    /// # Errors
    ///
    /// ファイルの読み込み・パース・検証に失敗した場合にエラーを返す
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// パスが指定されていれば読み込み、なければデフォルト値を使う
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// 設定値の妥当性を検証する
    pub fn validate(&self) -> Result<()> {
        ensure!(self.session.ttl_secs > 0, "session.ttl_secs must be positive");
        ensure!(
            self.session.max_sessions >= 1,
            "session.max_sessions must be at least 1"
        );
        ensure!(
            self.session.sweep_interval_secs > 0,
            "session.sweep_interval_secs must be positive"
        );
        ensure!(
            self.analysis.per_file_timeout_ms > 0,
            "analysis.per_file_timeout_ms must be positive"
        );
        ensure!(
            self.analysis.max_concurrent_files >= 1,
            "analysis.max_concurrent_files must be at least 1"
        );
        ensure!(
            self.analysis.extractor.max_abs_eps > 0.0,
            "analysis.extractor.max_abs_eps must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&self.analysis.extractor.min_confidence),
            "analysis.extractor.min_confidence must be between 0 and 1"
        );
        ensure!(
            self.server.max_upload_bytes > 0,
            "server.max_upload_bytes must be positive"
        );
        Ok(())
    }
}
