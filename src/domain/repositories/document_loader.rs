//! # Document Loader Trait
//!
//! 生バイト列からパース済みドキュメントへの変換を抽象化

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::parsed_document::ParsedDocument;
use crate::domain::errors::DocumentError;

/// ドキュメントローダー
///
/// ブロッキングスレッド上で呼ばれる同期処理。ネットワーク・ファイルシステムにはアクセスしない。
#[cfg_attr(test, automock)]
pub trait DocumentLoader: Send + Sync {
    /// バイト列をパースする
    ///
    /// # Arguments
    ///
    /// * `bytes` - アップロードされたファイルの内容
    /// * `filename` - 申告されたファイル名
    ///
    /// # Errors
    ///
    /// - 空の入力: `DocumentError::EmptyInput`
    /// - HTML として認識できない入力: `DocumentError::UnsupportedFormat`
    fn load(&self, bytes: &[u8], filename: &str) -> Result<ParsedDocument, DocumentError>;
}
