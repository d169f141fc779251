//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - HTTP・HTMLパーサー・ランタイムについて何も知らない
//! - 純粋なビジネスロジック（EPS抽出、CSV出力）
//!
//! ## 構成要素
//!
//! - **entities**: ビジネスエンティティ（UploadedFile, ParsedDocument, ExtractionResult, Batch）
//! - **errors**: エラー分類
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **services**: Domain Service（EPS抽出、CSV出力）

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
