//! 서버 조회 결과 캐시.
//!
//! 로그아웃 시 통째로 비워 다음 로그인 사용자에게 이전 사용자의 데이터가 보이지
//! 않도록 합니다. 비울 때마다 세대 번호가 증가하며, 비우기 전에 시작된 요청의
//! 결과는 [`QueryCache::insert_if_current`]에서 버려집니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

#[derive(Debug)]
struct CacheInner {
    entries: RwLock<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
    ttl: Duration,
}

/// 조회 캐시 핸들. 복제본은 같은 저장 공간을 공유합니다.
#[derive(Debug, Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                generation: AtomicU64::new(0),
                ttl,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.inner
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.inner
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 현재 세대 번호.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// TTL 안에 저장된 값 조회.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.read();
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.inner.ttl)
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.write().insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// 요청 시작 시점의 세대가 아직 유효할 때만 저장합니다.
    ///
    /// 저장했으면 `true`.
    pub fn insert_if_current(&self, key: impl Into<String>, value: Value, generation: u64) -> bool {
        let mut entries = self.write();
        if self.generation() != generation {
            debug!("Discarding response fetched before cache was cleared");
            return false;
        }
        entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
        true
    }

    /// 접두사로 시작하는 키 무효화.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// 전체 비우기.
    pub fn clear(&self) {
        let mut entries = self.write();
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        let dropped = entries.len();
        entries.clear();
        debug!(dropped, "Query cache cleared");
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(300))
    }
}
