//! # Batch Value Object
//!
//! 1回のアップロードで生成された抽出結果の集合

use chrono::{DateTime, Utc};

use super::extraction_result::ExtractionResult;

/// 抽出結果のバッチ
///
/// 行はアップロード順を保持する。セッションストアに登録された後は変更されない。
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    session_id: String,
    created_at: DateTime<Utc>,
    rows: Vec<ExtractionResult>,
}

impl Batch {
    /// 新しいバッチを作成
    ///
    /// # Arguments
    ///
    /// * `session_id` - セッションID
    /// * `created_at` - 作成日時
    /// * `rows` - アップロード順の抽出結果
    pub fn new(
        session_id: impl Into<String>,
        created_at: DateTime<Utc>,
        rows: Vec<ExtractionResult>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            created_at,
            rows,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 行への参照を返す
    pub fn rows(&self) -> &[ExtractionResult] {
        &self.rows
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// EPS が見つかった行の数
    pub fn found_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_found()).count()
    }
}
