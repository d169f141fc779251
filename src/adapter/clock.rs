//! # Clock
//!
//! 現在時刻の取得を抽象化（セッション期限の判定用）

use chrono::{DateTime, Utc};

/// 時計
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// システム時計
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
