//! # Session Repository Trait
//!
//! 抽出結果バッチのセッション保持を抽象化

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::batch::Batch;
use crate::domain::entities::extraction_result::ExtractionResult;
use crate::domain::errors::SessionError;

/// セッションリポジトリ
///
/// セッションID → バッチの対応を期限付きで保持する
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// バッチを登録し、新しいセッションIDを割り当てる
    ///
    /// # Arguments
    ///
    /// * `rows` - アップロード順の抽出結果
    ///
    /// # Returns
    ///
    /// セッションIDが割り当てられたバッチ
    ///
    /// # Errors
    ///
    /// ストアへの登録に失敗した場合にエラーを返す
    async fn create(&self, rows: Vec<ExtractionResult>) -> Result<Arc<Batch>>;

    /// セッションIDからバッチを取得する
    ///
    /// # Errors
    ///
    /// 未登録・期限切れ・追い出し済みの場合に `SessionError` を返す
    async fn get(&self, session_id: &str) -> std::result::Result<Arc<Batch>, SessionError>;

    /// 期限切れのセッションを削除し、削除件数を返す
    async fn purge_expired(&self) -> usize;

    /// 保持中のセッション数
    async fn active_count(&self) -> usize;
}
