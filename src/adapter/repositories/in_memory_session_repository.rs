//! In-Memory Session Repository Implementation
//!
//! SessionRepositoryのメモリ内実装
//!
//! - 期限（TTL）を過ぎたセッションは取得時に削除し、定期スイープでも削除する
//! - 上限を超えたら作成が最も古いセッションから追い出す
//! - ロックが poison された場合はエラーを記録し、保持中のデータで処理を続ける

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};

#[cfg(test)]
use mockall::automock;

use crate::adapter::clock::{Clock, SystemClock};
use crate::domain::entities::batch::Batch;
use crate::domain::entities::extraction_result::ExtractionResult;
use crate::domain::errors::SessionError;
use crate::domain::repositories::session_repository::SessionRepository;

/// 同じIDが続いた場合に再生成する回数の上限
const MAX_ID_ATTEMPTS: usize = 8;

/// セッションID生成器
#[cfg_attr(test, automock)]
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// UUID v4 によるID生成
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[derive(Default)]
struct Store {
    sessions: HashMap<String, Arc<Batch>>,
    /// 作成順のセッションID
    order: VecDeque<String>,
}

impl Store {
    fn remove(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
        self.order.retain(|id| id != session_id);
    }
}

/// メモリ内セッションリポジトリ
pub struct InMemorySessionRepository {
    store: RwLock<Store>,
    ttl: chrono::Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl InMemorySessionRepository {
    /// 新しいリポジトリを作成
    ///
    /// # Arguments
    ///
    /// * `ttl` - セッションの有効期間
    /// * `capacity` - 保持するセッション数の上限（0 は 1 として扱う）
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_dependencies(ttl, capacity, Arc::new(SystemClock), Arc::new(UuidGenerator))
    }

    /// 時計とID生成器を指定して作成
    pub fn with_dependencies(
        ttl: Duration,
        capacity: usize,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            capacity: capacity.max(1),
            clock,
            ids,
        }
    }

    fn is_expired(&self, batch: &Batch, now: DateTime<Utc>) -> bool {
        batch
            .created_at()
            .checked_add_signed(self.ttl)
            .is_some_and(|expires_at| now >= expires_at)
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(|poisoned| {
            error!("Session store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(|poisoned| {
            error!("Session store lock poisoned; recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, rows: Vec<ExtractionResult>) -> Result<Arc<Batch>> {
        let now = self.clock.now();
        let mut store = self.write();

        let session_id = (0..MAX_ID_ATTEMPTS)
            .map(|_| self.ids.generate())
            .find(|id| !store.sessions.contains_key(id))
            .ok_or_else(|| anyhow!("failed to generate a unique session id"))?;

        let batch = Arc::new(Batch::new(session_id.clone(), now, rows));
        store.sessions.insert(session_id.clone(), Arc::clone(&batch));
        store.order.push_back(session_id);

        while store.sessions.len() > self.capacity {
            let Some(oldest) = store.order.pop_front() else {
                break;
            };
            store.sessions.remove(&oldest);
            info!("Evicted session {} (capacity {})", oldest, self.capacity);
        }

        Ok(batch)
    }

    async fn get(&self, session_id: &str) -> std::result::Result<Arc<Batch>, SessionError> {
        let now = self.clock.now();
        let not_found = || SessionError::NotFound(session_id.to_string());

        let batch = self
            .read()
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(not_found)?;

        if self.is_expired(&batch, now) {
            self.write().remove(session_id);
            debug!("Session {} expired on access", session_id);
            return Err(SessionError::Expired(session_id.to_string()));
        }

        Ok(batch)
    }

    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut store = self.write();

        let expired: Vec<String> = store
            .sessions
            .iter()
            .filter(|(_, batch)| self.is_expired(batch, now))
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            store.remove(id);
        }
        expired.len()
    }

    async fn active_count(&self) -> usize {
        self.read().sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::clock::testing::ManualClock;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 25, 10, 0, 0).unwrap()
    }

    fn rows(name: &str) -> Vec<ExtractionResult> {
        vec![ExtractionResult::found(name, 1.0)]
    }

    fn repository(
        ttl_secs: u64,
        capacity: usize,
    ) -> (InMemorySessionRepository, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(start()));
        let repository = InMemorySessionRepository::with_dependencies(
            Duration::from_secs(ttl_secs),
            capacity,
            clock.clone(),
            Arc::new(UuidGenerator),
        );
        (repository, clock)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (repository, _) = repository(3600, 10);

        let batch = repository.create(rows("a.html")).await.unwrap();
        let fetched = repository.get(batch.session_id()).await.unwrap();

        assert_eq!(fetched, batch);
        assert_eq!(fetched.created_at(), start());
        assert_eq!(repository.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let (repository, _) = repository(3600, 10);

        let result = repository.get("no-such-session").await;

        assert_eq!(
            result,
            Err(SessionError::NotFound("no-such-session".to_string()))
        );
    }

    #[tokio::test]
    async fn test_get_expired_removes_session() {
        let (repository, clock) = repository(60, 10);
        let batch = repository.create(rows("a.html")).await.unwrap();
        let id = batch.session_id().to_string();

        clock.advance(chrono::Duration::seconds(59));
        assert!(repository.get(&id).await.is_ok());

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(repository.get(&id).await, Err(SessionError::Expired(id.clone())));
        assert_eq!(repository.get(&id).await, Err(SessionError::NotFound(id)));
        assert_eq!(repository.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest_first() {
        let (repository, clock) = repository(3600, 2);

        let first = repository.create(rows("1.html")).await.unwrap();
        clock.advance(chrono::Duration::seconds(1));
        let second = repository.create(rows("2.html")).await.unwrap();
        clock.advance(chrono::Duration::seconds(1));
        let third = repository.create(rows("3.html")).await.unwrap();

        assert!(matches!(
            repository.get(first.session_id()).await,
            Err(SessionError::NotFound(_))
        ));
        assert!(repository.get(second.session_id()).await.is_ok());
        assert!(repository.get(third.session_id()).await.is_ok());
        assert_eq!(repository.active_count().await, 2);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (repository, clock) = repository(60, 10);
        repository.create(rows("old.html")).await.unwrap();
        clock.advance(chrono::Duration::seconds(30));
        let fresh = repository.create(rows("new.html")).await.unwrap();
        clock.advance(chrono::Duration::seconds(31));

        assert_eq!(repository.purge_expired().await, 1);
        assert_eq!(repository.active_count().await, 1);
        assert!(repository.get(fresh.session_id()).await.is_ok());
        assert_eq!(repository.purge_expired().await, 0);
    }

    #[tokio::test]
    async fn test_create_redraws_colliding_id() {
        let mut ids = MockIdGenerator::new();
        let mut sequence = mockall::Sequence::new();
        for id in ["dup", "dup", "fresh"] {
            ids.expect_generate()
                .times(1)
                .in_sequence(&mut sequence)
                .return_const(id.to_string());
        }
        let repository = InMemorySessionRepository::with_dependencies(
            Duration::from_secs(3600),
            10,
            Arc::new(SystemClock),
            Arc::new(ids),
        );

        let first = repository.create(rows("a.html")).await.unwrap();
        let second = repository.create(rows("b.html")).await.unwrap();

        assert_eq!(first.session_id(), "dup");
        assert_eq!(second.session_id(), "fresh");
    }

    #[tokio::test]
    async fn test_create_fails_when_ids_keep_colliding() {
        let mut ids = MockIdGenerator::new();
        ids.expect_generate().return_const("same".to_string());
        let repository = InMemorySessionRepository::with_dependencies(
            Duration::from_secs(3600),
            10,
            Arc::new(SystemClock),
            Arc::new(ids),
        );

        repository.create(rows("a.html")).await.unwrap();
        assert!(repository.create(rows("b.html")).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let repository = Arc::new(InMemorySessionRepository::new(
            Duration::from_secs(3600),
            100,
        ));

        let mut handles = Vec::new();
        for i in 0..20 {
            let repository = Arc::clone(&repository);
            handles.push(tokio::spawn(async move {
                repository
                    .create(rows(&format!("{}.html", i)))
                    .await
                    .unwrap()
                    .session_id()
                    .to_string()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 20);
        assert_eq!(repository.active_count().await, 20);
    }

    #[tokio::test]
    async fn test_poisoned_lock_keeps_sessions_reachable() {
        let (repository, _) = repository(3600, 10);
        let repository = Arc::new(repository);
        let batch = repository.create(rows("a.html")).await.unwrap();

        let holder = Arc::clone(&repository);
        let _ = std::thread::spawn(move || {
            let _guard = holder.store.write().unwrap();
            panic!("writer panicked while holding the lock");
        })
        .join();
        assert!(repository.store.is_poisoned());

        assert!(repository.get(batch.session_id()).await.is_ok());
        assert_eq!(repository.active_count().await, 1);
        assert_eq!(repository.purge_expired().await, 0);
        assert!(repository.create(rows("b.html")).await.is_ok());
        assert_eq!(repository.active_count().await, 2);
    }
}
