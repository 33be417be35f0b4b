//! 세션 스토어.
//!
//! 현재 세션의 유일한 소유자입니다. 다른 구성 요소는 스냅샷을 읽거나 구독만 하며,
//! 변경은 [`SessionStore::login`]과 [`SessionStore::logout`]으로만 일어납니다.
//!
//! 스냅샷은 `watch` 채널에 통째로 교체되므로 읽는 쪽은 항상 이전 또는 새 세션
//! 전체만 관찰합니다. 영속화와 메모리 반영은 하나의 변경 잠금 안에서 이루어져
//! 동시에 도착한 로그인/로그아웃이 저장소와 메모리를 서로 다르게 만들지 않습니다.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use hrm_core::{Session, UserIdentity};

use crate::error::StorageError;
use crate::storage::SessionStorage;

/// 현재 영속화 형식 버전.
const STORAGE_VERSION: u32 = 0;

/// 저장소에 기록되는 봉투 형식: `{"state": {...}, "version": 0}`.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    state: Session,
    version: u32,
}

struct Inner {
    storage: Arc<dyn SessionStorage>,
    key: String,
    tx: watch::Sender<Session>,
    mutation: Mutex<()>,
}

/// 세션 스토어 핸들.
///
/// 복제 비용이 낮으며, 모든 복제본은 같은 세션을 공유합니다. UI 수명 주기와 무관하게
/// HTTP 미들웨어에서도 읽을 수 있도록 명시적으로 전달합니다.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.tx.borrow();
        f.debug_struct("SessionStore")
            .field("key", &self.inner.key)
            .field("is_authenticated", &session.is_authenticated())
            .field("user", &session.user().map(|u| u.id.as_str()))
            .finish()
    }
}

impl SessionStore {
    /// 저장소에서 이전 세션을 복원하며 스토어를 엽니다.
    ///
    /// 저장된 값이 없거나, 해석할 수 없거나, 세션 불변식을 어기면 빈 세션으로
    /// 시작합니다. 어떤 경우에도 실패하지 않습니다.
    pub fn open(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let initial = restore(storage.as_ref(), &key);
        let (tx, _rx) = watch::channel(initial);

        Self {
            inner: Arc::new(Inner {
                storage,
                key,
                tx,
                mutation: Mutex::new(()),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner
            .mutation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, session: &Session) -> Result<(), StorageError> {
        let envelope = PersistedSession {
            state: session.clone(),
            version: STORAGE_VERSION,
        };
        let raw = serde_json::to_string(&envelope)?;
        self.inner.storage.save(&self.inner.key, &raw)
    }

    /// 세션을 통째로 교체합니다.
    ///
    /// 새 스냅샷을 먼저 영속화한 뒤 메모리에 반영하고 구독자에게 알립니다.
    ///
    /// # Errors
    ///
    /// 영속화에 실패하면 메모리 상태도 바꾸지 않고 [`StorageError`]를 반환합니다.
    pub fn login(&self, user: UserIdentity, token: impl Into<String>) -> Result<(), StorageError> {
        let next = Session::authenticated(user, token);
        let _guard = self.lock();

        self.persist(&next)?;

        let user_id = next.user().map(|u| u.id.clone()).unwrap_or_default();
        let roles: Vec<&'static str> = next
            .user()
            .map(|u| u.roles.iter().map(|r| r.as_tag()).collect())
            .unwrap_or_default();
        self.inner.tx.send_replace(next);

        info!(user_id = %user_id, roles = ?roles, "Session established");
        Ok(())
    }

    /// 세션을 비웁니다.
    ///
    /// 이미 로그아웃 상태면 아무것도 하지 않고 `false`를 반환합니다. 여러 요청이
    /// 동시에 401을 받아 연달아 호출해도 첫 호출만 효과가 있습니다.
    /// 영속화 실패는 기록만 하고 메모리 상태는 항상 비웁니다.
    pub fn logout(&self) -> bool {
        let _guard = self.lock();

        if !self.inner.tx.borrow().is_authenticated() {
            debug!("Logout requested with no active session");
            return false;
        }

        let cleared = Session::empty();
        if let Err(e) = self.persist(&cleared) {
            warn!(error = %e, "Failed to persist cleared session");
        }
        self.inner.tx.send_replace(cleared);

        info!("Session cleared");
        true
    }

    /// 현재 세션 스냅샷.
    pub fn snapshot(&self) -> Session {
        self.inner.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.tx.borrow().is_authenticated()
    }

    /// 현재 토큰.
    pub fn token(&self) -> Option<String> {
        self.inner.tx.borrow().token().map(str::to_string)
    }

    /// 세션 변경 구독.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.tx.subscribe()
    }
}

fn restore(storage: &dyn SessionStorage, key: &str) -> Session {
    let raw = match storage.load(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key = %key, "No persisted session");
            return Session::empty();
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Failed to read persisted session, starting empty");
            return Session::empty();
        }
    };

    let envelope: PersistedSession = match serde_json::from_str(&raw) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(key = %key, error = %e, "Persisted session is unreadable, starting empty");
            return discard(storage, key);
        }
    };

    if envelope.version != STORAGE_VERSION {
        warn!(
            key = %key,
            version = envelope.version,
            "Unsupported persisted session version, starting empty"
        );
        return discard(storage, key);
    }

    if !envelope.state.is_structurally_valid() {
        warn!(key = %key, "Persisted session violates invariants, starting empty");
        return discard(storage, key);
    }

    if let Some(user) = envelope.state.user() {
        info!(user_id = %user.id, "Restored persisted session");
    }
    envelope.state
}

/// 쓸 수 없는 저장 항목을 지우고 빈 세션을 돌려줍니다.
fn discard(storage: &dyn SessionStorage, key: &str) -> Session {
    if let Err(e) = storage.remove(key) {
        warn!(key = %key, error = %e, "Failed to remove unusable persisted session");
    }
    Session::empty()
}
