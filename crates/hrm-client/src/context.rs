//! 클라이언트 구성 요소 배선.
//!
//! 시작 시 한 번 만들어 필요한 곳에 명시적으로 전달합니다. 세션 스토어, 조회 캐시,
//! 미들웨어는 모든 API 클라이언트가 같은 인스턴스를 공유합니다.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use hrm_core::{AppConfig, CoreError, CoreResult, HardNavigator, Navigator};
use hrm_session::{
    FileStorage, NavigationOutcome, RoleGate, RouteTable, RoutingError, SessionStorage,
    SessionStore,
};

use crate::api::{
    ApiClient, BearerAuth, ForceLogoutOnUnauthorized, HttpAuthApi, RequestMiddleware,
    ResponseMiddleware, TraceRequests,
};
use crate::cache::QueryCache;
use crate::error::ClientError;
use crate::flow::{LoginFlow, LogoutFlow};

/// core 서비스 클라이언트 이름.
pub const CORE_CLIENT: &str = "core";
/// employee 서비스 클라이언트 이름.
pub const EMPLOYEE_CLIENT: &str = "employee";

pub struct ClientContext {
    config: AppConfig,
    store: SessionStore,
    cache: QueryCache,
    core: ApiClient,
    employee: ApiClient,
    routes: RouteTable,
    navigator: Arc<dyn Navigator>,
    login: LoginFlow,
    logout: LogoutFlow,
}

impl std::fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientContext")
            .field("store", &self.store)
            .field("core", &self.core)
            .field("employee", &self.employee)
            .finish()
    }
}

impl ClientContext {
    /// 주어진 저장소와 내비게이터로 컨텍스트를 구성합니다.
    ///
    /// # Errors
    ///
    /// API 기본 URL이 유효하지 않으면 [`ClientError::Config`].
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
        hard_navigator: Arc<dyn HardNavigator>,
    ) -> Result<Self, ClientError> {
        let store = SessionStore::open(storage, config.storage.session_key.clone());
        let cache = QueryCache::new(Duration::from_secs(config.cache.ttl_secs));

        let bearer: Arc<dyn RequestMiddleware> = Arc::new(BearerAuth::new(store.clone()));
        let force_logout: Arc<dyn ResponseMiddleware> = Arc::new(
            ForceLogoutOnUnauthorized::new(
                store.clone(),
                cache.clone(),
                hard_navigator,
                config.routing.login_route.clone(),
            )
            .with_exemption(CORE_CLIENT, config.auth.login_path.clone()),
        );
        let trace: Arc<dyn ResponseMiddleware> = Arc::new(TraceRequests);

        let build = |name: &str, base_url: &str| {
            ApiClient::builder(name, base_url)
                .timeout(Duration::from_secs(config.api.timeout_secs))
                .unauthorized_statuses(config.auth.unauthorized_statuses.iter().copied())
                .request_middleware(bearer.clone())
                .response_middleware(trace.clone())
                .response_middleware(force_logout.clone())
                .cache(cache.clone())
                .build()
        };
        let core = build(CORE_CLIENT, &config.api.core_base_url)?;
        let employee = build(EMPLOYEE_CLIENT, &config.api.employee_base_url)?;

        let routes = RouteTable::standard(RoleGate::new(&config.routing));
        let auth = Arc::new(HttpAuthApi::new(core.clone(), config.auth.login_path.clone()));
        let login = LoginFlow::new(auth, store.clone(), navigator.clone());
        let logout = LogoutFlow::new(
            store.clone(),
            cache.clone(),
            navigator.clone(),
            config.routing.login_route.clone(),
        );

        info!(
            core = %core.base_url(),
            employee = %employee.base_url(),
            authenticated = store.is_authenticated(),
            "Client context ready"
        );

        Ok(Self {
            config,
            store,
            cache,
            core,
            employee,
            routes,
            navigator,
            login,
            logout,
        })
    }

    /// 설정된 디렉터리의 파일 저장소를 사용하는 컨텍스트.
    ///
    /// # Errors
    ///
    /// 저장 디렉터리를 만들 수 없으면 [`CoreError::Storage`], 클라이언트 구성이
    /// 실패하면 [`CoreError::Config`].
    pub fn from_config(
        config: AppConfig,
        navigator: Arc<dyn Navigator>,
        hard_navigator: Arc<dyn HardNavigator>,
    ) -> CoreResult<Self> {
        let storage = FileStorage::new(&config.storage.dir)?;
        Self::new(config, Arc::new(storage), navigator, hard_navigator)
            .map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn core(&self) -> &ApiClient {
        &self.core
    }

    pub fn employee(&self) -> &ApiClient {
        &self.employee
    }

    /// 이름으로 API 클라이언트 조회.
    pub fn client(&self, name: &str) -> Option<&ApiClient> {
        match name {
            CORE_CLIENT => Some(&self.core),
            EMPLOYEE_CLIENT => Some(&self.employee),
            _ => None,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn login_flow(&self) -> &LoginFlow {
        &self.login
    }

    pub fn logout_flow(&self) -> &LogoutFlow {
        &self.logout
    }

    /// 현재 세션으로 경로를 판정하며 이동합니다. 매번 최신 스냅샷을 사용합니다.
    pub fn navigate(&self, path: &str) -> Result<NavigationOutcome, RoutingError> {
        let session = self.store.snapshot();
        self.routes
            .navigate(path, &session, self.navigator.as_ref())
    }
}
