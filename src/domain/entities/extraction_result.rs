//! # ExtractionResult Entity
//!
//! ファイル1件分のEPS抽出結果

use serde::{Deserialize, Serialize};

/// 抽出結果
///
/// アップロードされたファイルごとに1件生成され、生成後は変更されない。
/// JSON では `{"filename": ..., "eps": ...}` として返す（`warning` は値がある場合のみ）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub filename: String,
    pub eps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ExtractionResult {
    /// EPS が見つかった結果
    pub fn found(filename: impl Into<String>, eps: f64) -> Self {
        Self {
            filename: filename.into(),
            eps: Some(eps),
            warning: None,
        }
    }

    /// EPS が得られなかった結果（理由付き）
    pub fn failed(filename: impl Into<String>, warning: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            eps: None,
            warning: Some(warning.into()),
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.eps.is_some()
    }
}
