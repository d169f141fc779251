//! # Domain Services
//!
//! ドメインサービス層
//!
//! - **amount**: 金額表記の解析
//! - **eps_label**: EPS ラベルと区分の検出
//! - **eps_matchers**: EPS 候補を探す戦略群
//! - **eps_extractor**: 候補の選択と信頼度判定
//! - **csv_renderer**: バッチの CSV 変換

pub mod amount;
pub mod csv_renderer;
pub mod eps_extractor;
pub mod eps_label;
pub mod eps_matchers;
