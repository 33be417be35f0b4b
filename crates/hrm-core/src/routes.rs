//! 라우트 상수 및 내비게이션 인터페이스.
//!
//! 클라이언트 측 라우트 전환([`Navigator`])과 전체 페이지 로드([`HardNavigator`])를
//! 별도의 능력으로 분리합니다. 강제 로그아웃은 메모리 상태를 모두 버려야 하므로
//! 항상 [`HardNavigator`]를 통해 이동합니다.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// 인증되지 않은 사용자의 기본 진입 라우트.
pub const LOGIN: &str = "/login";
/// 로그인 직후 이동하는 라우트. 역할별 리다이렉트가 여기서 시작됩니다.
pub const ROOT: &str = "/";
/// 관리자 랜딩 페이지.
pub const ADMIN_HOME: &str = "/admin";
/// 매니저 랜딩 페이지.
pub const MANAGER_HOME: &str = "/manager";
/// 직원 랜딩 페이지.
pub const EMPLOYEE_HOME: &str = "/employee";

/// 역할별 랜딩 라우트.
pub fn home_for(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_HOME,
        Role::Manager => MANAGER_HOME,
        Role::Employee => EMPLOYEE_HOME,
    }
}

/// 클라이언트 측 라우트 전환.
pub trait Navigator: Send + Sync {
    /// 히스토리에 새 항목을 추가하며 이동.
    fn push(&self, path: &str);

    /// 현재 히스토리 항목을 교체하며 이동 (뒤로 가기로 돌아올 수 없음).
    fn replace(&self, path: &str);

    /// 현재 위치.
    fn current(&self) -> String;
}

/// 전체 페이지 로드. 모든 메모리 상태를 버리고 대상 위치에서 다시 시작합니다.
pub trait HardNavigator: Send + Sync {
    fn hard_navigate(&self, path: &str);
}

/// 내비게이션 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationKind {
    Push,
    Replace,
    Hard,
}

/// 기록된 내비게이션.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    pub kind: NavigationKind,
    pub path: String,
}

#[derive(Debug)]
struct NavigatorState {
    entries: Vec<String>,
    events: Vec<NavigationEvent>,
}

/// 메모리 기반 내비게이터.
///
/// 히스토리 스택과 모든 내비게이션 이벤트를 기록합니다. CLI와 테스트 양쪽에서
/// [`Navigator`]와 [`HardNavigator`]로 사용됩니다.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

impl MemoryNavigator {
    /// 주어진 위치에서 시작하는 내비게이터 생성.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                entries: vec![start.into()],
                events: Vec::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NavigatorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 현재 히스토리 스택 (가장 오래된 항목부터).
    pub fn history(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    /// 지금까지 기록된 내비게이션 이벤트.
    pub fn events(&self) -> Vec<NavigationEvent> {
        self.lock().events.clone()
    }

    /// 전체 페이지 로드 횟수.
    pub fn hard_loads(&self) -> usize {
        self.lock()
            .events
            .iter()
            .filter(|e| e.kind == NavigationKind::Hard)
            .count()
    }

    fn record(&self, kind: NavigationKind, path: &str) {
        let mut state = self.lock();
        match kind {
            NavigationKind::Push => state.entries.push(path.to_string()),
            NavigationKind::Replace => {
                if let Some(last) = state.entries.last_mut() {
                    *last = path.to_string();
                } else {
                    state.entries.push(path.to_string());
                }
            }
            NavigationKind::Hard => {
                state.entries.clear();
                state.entries.push(path.to_string());
            }
        }
        state.events.push(NavigationEvent {
            kind,
            path: path.to_string(),
        });
        tracing::debug!(kind = ?kind, path = %path, "Navigated");
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(ROOT)
    }
}

impl Navigator for MemoryNavigator {
    fn push(&self, path: &str) {
        self.record(NavigationKind::Push, path);
    }

    fn replace(&self, path: &str) {
        self.record(NavigationKind::Replace, path);
    }

    fn current(&self) -> String {
        self.lock().entries.last().cloned().unwrap_or_else(|| ROOT.to_string())
    }
}

impl HardNavigator for MemoryNavigator {
    fn hard_navigate(&self, path: &str) {
        self.record(NavigationKind::Hard, path);
    }
}
