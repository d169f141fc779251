//! Session Sweeper
//!
//! 期限切れセッションを定期的に削除するバックグラウンドタスク

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repositories::session_repository::SessionRepository;

/// スイーパーを起動する
///
/// `shutdown` に `true` が送られるか送信側が破棄されると停止する
pub fn spawn_sweeper<S: SessionRepository + 'static>(
    sessions: Arc<S>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 最初の tick は即時
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = sessions.purge_expired().await;
                    if purged > 0 {
                        info!(
                            "Purged {} expired sessions ({} active)",
                            purged,
                            sessions.active_count().await
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Session sweeper stopped");
    })
}
