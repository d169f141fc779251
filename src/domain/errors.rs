//! # Domain Errors
//!
//! ドメイン層のエラー分類
//!
//! - **DocumentError**: 入力ファイル起因のエラー（行単位の失敗として扱う）
//! - **BatchError**: バッチ全体の失敗（ファイルが1つもない場合のみ）
//! - **SessionError**: セッション未登録・期限切れ（正常系の Not Found）

use thiserror::Error;

/// ドキュメント読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// 空の入力
    #[error("{filename}: file is empty")]
    EmptyInput { filename: String },

    /// HTML として認識できない入力
    #[error("{filename}: unsupported format ({reason})")]
    UnsupportedFormat { filename: String, reason: String },
}

impl DocumentError {
    pub fn unsupported(filename: &str, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }
}

/// バッチ処理エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// ファイルが1つも送信されなかった
    #[error("No file uploaded")]
    EmptyBatch,
}

/// セッション取得エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(String),

    #[error("session {0} expired")]
    Expired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_messages() {
        let empty = DocumentError::EmptyInput {
            filename: "q1.html".to_string(),
        };
        assert_eq!(empty.to_string(), "q1.html: file is empty");

        let unsupported = DocumentError::unsupported("q1.pdf", "binary content");
        assert_eq!(
            unsupported.to_string(),
            "q1.pdf: unsupported format (binary content)"
        );
    }

    #[test]
    fn test_empty_batch_message_matches_api_contract() {
        assert_eq!(BatchError::EmptyBatch.to_string(), "No file uploaded");
    }

    #[test]
    fn test_session_error_messages() {
        assert_eq!(
            SessionError::NotFound("abc".to_string()).to_string(),
            "session abc not found"
        );
        assert_eq!(
            SessionError::Expired("xyz".to_string()).to_string(),
            "session xyz expired"
        );
    }
}
