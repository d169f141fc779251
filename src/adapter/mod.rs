//! Adapter Layer
//!
//! 外部の仕組み（HTMLパーサー、メモリ内ストア、設定ファイル、時計）との統合

pub mod clock;
pub mod config;
pub mod html;
pub mod repositories;
