//! # Use Cases
//!
//! アプリケーションのビジネスフロー（ユースケース）
//!
//! ## ユースケース
//!
//! - **ProcessBatchUseCase**: アップロードファイル群からの EPS 抽出
//! - **AnalyzeUploadsUseCase**: 抽出とセッション登録
//! - **ExportSessionUseCase**: セッションの CSV 出力

pub mod analyze_uploads;
pub mod export_session;
pub mod process_batch;
