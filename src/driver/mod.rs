//! # Driver Layer (Presentation)
//!
//! HTTP API とCLIを提供
//!
//! ## 特徴
//!
//! - Use Caseを呼び出してビジネスフローを起動
//! - 依存性注入（DI）を行い、全てを組み立てる
//! - ユーザーとのインターフェース
//!
//! ## 構成要素
//!
//! - **cli**: CLI引数のパース
//! - **state**: ハンドラー間で共有する状態（DI済みのユースケース）
//! - **handlers**: HTTPハンドラー
//! - **response**: エラーレスポンス
//! - **server**: ルーター構築とサーバー起動
//! - **sweeper**: 期限切れセッションの定期削除

pub mod cli;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;
pub mod sweeper;

pub use cli::Args;
pub use server::{build_router, serve};
pub use state::AppState;
