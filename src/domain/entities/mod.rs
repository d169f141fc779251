//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **UploadedFile**: アップロードされたファイル（リクエスト内でのみ生存）
//! - **ParsedDocument**: パース済みドキュメント（テキストブロックの列）
//! - **ExtractionResult**: ファイル1件分の抽出結果
//! - **Batch**: 1回のアップロードで生成された結果の集合

pub mod batch;
pub mod extraction_result;
pub mod parsed_document;
pub mod uploaded_file;
