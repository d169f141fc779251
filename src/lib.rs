//! # filing-eps
//!
//! 決算書HTMLから1株当たり利益（EPS）を抽出するHTTPサービス
//!
//! このプロジェクトはクリーンアーキテクチャを採用しており、以下の4層で構成されています：
//!
//! - **Domain層**: EPS抽出・CSV出力のルールとエンティティ（HTTP・パーサーに依存しない）
//! - **Application層**: バッチ解析・セッション登録・CSV出力のユースケース
//! - **Adapter層**: HTMLパーサー、メモリ内セッションストア、設定ファイル
//! - **Driver層**: HTTP API、CLI、依存性注入

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

// Domain層（純粋なビジネスロジック）
pub mod domain;

// Application層（ユースケース）
pub mod application;

// Adapter層（Infrastructure）
pub mod adapter;

// Driver層（Presentation）
pub mod driver;
