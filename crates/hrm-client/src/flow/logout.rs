//! 사용자가 직접 요청한 로그아웃.
//!
//! 401에 의한 강제 로그아웃은 [`ForceLogoutOnUnauthorized`](crate::ForceLogoutOnUnauthorized)가
//! 처리하며 하드 내비게이션을 사용합니다. 이쪽은 클라이언트 라우팅(`replace`)으로 이동합니다.

use std::sync::Arc;

use tracing::info;

use hrm_core::Navigator;
use hrm_session::SessionStore;

use crate::cache::QueryCache;

pub struct LogoutFlow {
    store: SessionStore,
    cache: QueryCache,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl LogoutFlow {
    pub fn new(
        store: SessionStore,
        cache: QueryCache,
        navigator: Arc<dyn Navigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            navigator,
            login_route: login_route.into(),
        }
    }

    /// 세션과 조회 캐시를 비우고 로그인 화면으로 이동합니다.
    ///
    /// 이미 로그아웃된 상태에서도 이동은 다시 수행합니다. 실제로 세션을 지웠으면 `true`.
    pub fn logout(&self) -> bool {
        let cleared = self.store.logout();
        self.cache.clear();
        self.navigator.replace(&self.login_route);

        if cleared {
            info!("User logged out");
        }
        cleared
    }
}
