//! 요청/응답 미들웨어.
//!
//! 모든 API 클라이언트는 같은 미들웨어 인스턴스를 공유하여 헤더 형식과 401 처리가
//! 클라이언트마다 달라지지 않도록 합니다.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response};
use tracing::{debug, warn};

use hrm_core::HardNavigator;
use hrm_session::SessionStore;

use crate::cache::QueryCache;
use crate::error::ClientError;

use super::client::ResponseContext;

/// 전송 직전에 요청을 수정하는 미들웨어.
pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError>;
}

/// 모든 응답(성공과 에러)을 호출자보다 먼저 받는 미들웨어.
pub trait ResponseMiddleware: Send + Sync {
    fn on_response(
        &self,
        context: &ResponseContext,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError>;
}

/// `Bearer <token>` 헤더 값 생성. 로그에 노출되지 않도록 sensitive로 표시합니다.
pub fn bearer_header(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// 현재 세션의 토큰을 `Authorization` 헤더에 붙입니다.
///
/// 토큰이 없으면 요청을 건드리지 않습니다. 호출자가 직접 넣은 헤더도 덮어쓰지 않습니다.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    store: SessionStore,
}

impl BearerAuth {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError> {
        if request.headers().contains_key(AUTHORIZATION) {
            return Ok(());
        }
        if let Some(token) = self.store.token() {
            request
                .headers_mut()
                .insert(AUTHORIZATION, bearer_header(&token)?);
        }
        Ok(())
    }
}

/// 인증 실패 응답 시 세션을 강제로 종료합니다.
///
/// 세션 삭제, 캐시 비우기, 로그인 경로로의 하드 내비게이션 순으로 처리한 뒤
/// 원래 에러를 그대로 돌려줍니다. 이미 로그아웃된 상태에서도 다시 이동합니다.
pub struct ForceLogoutOnUnauthorized {
    store: SessionStore,
    cache: QueryCache,
    hard_navigator: Arc<dyn HardNavigator>,
    login_route: String,
    /// (클라이언트 이름, 경로) 단위 예외. 로그인 엔드포인트의 자격 증명 거부용.
    exemptions: Vec<(String, String)>,
}

impl std::fmt::Debug for ForceLogoutOnUnauthorized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceLogoutOnUnauthorized")
            .field("login_route", &self.login_route)
            .field("exemptions", &self.exemptions)
            .finish()
    }
}

impl ForceLogoutOnUnauthorized {
    pub fn new(
        store: SessionStore,
        cache: QueryCache,
        hard_navigator: Arc<dyn HardNavigator>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            store,
            cache,
            hard_navigator,
            login_route: login_route.into(),
            exemptions: Vec::new(),
        }
    }

    pub fn with_exemption(mut self, client: impl Into<String>, path: impl Into<String>) -> Self {
        self.exemptions.push((client.into(), path.into()));
        self
    }

    fn is_exempt(&self, context: &ResponseContext) -> bool {
        let path = context.path.split('?').next().unwrap_or_default();
        self.exemptions
            .iter()
            .any(|(client, exempt)| client == &context.client && exempt == path)
    }
}

impl ResponseMiddleware for ForceLogoutOnUnauthorized {
    fn on_response(
        &self,
        context: &ResponseContext,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError> {
        let err = match outcome {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if err.is_unauthorized() && !self.is_exempt(context) {
            warn!(
                client = %context.client,
                path = %context.path,
                status = ?err.status(),
                "Authorization failure, forcing logout"
            );
            let cleared = self.store.logout();
            self.cache.clear();
            self.hard_navigator.hard_navigate(&self.login_route);
            debug!(cleared, route = %self.login_route, "Forced logout completed");
        }

        Err(err)
    }
}

/// 요청 결과를 debug 레벨로 기록합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceRequests;

impl ResponseMiddleware for TraceRequests {
    fn on_response(
        &self,
        context: &ResponseContext,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError> {
        match &outcome {
            Ok(response) => debug!(
                client = %context.client,
                method = %context.method,
                path = %context.path,
                status = response.status().as_u16(),
                "API request completed"
            ),
            Err(err) => debug!(
                client = %context.client,
                method = %context.method,
                path = %context.path,
                error = %err,
                "API request failed"
            ),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrm_core::{MemoryNavigator, Navigator, Role, RoleSet, UserIdentity};
    use hrm_session::MemoryStorage;
    use reqwest::{Method, Url};

    fn store() -> SessionStore {
        SessionStore::open(Arc::new(MemoryStorage::new()), "auth-storage")
    }

    fn logged_in_store() -> SessionStore {
        let store = store();
        let user = UserIdentity::new("u-1", RoleSet::from([Role::Employee]));
        store.login(user, "tok.en.value").unwrap();
        store
    }

    fn request() -> Request {
        Request::new(Method::GET, Url::parse("http://localhost/api/me").unwrap())
    }

    fn context(client: &str, path: &str) -> ResponseContext {
        ResponseContext {
            client: client.to_string(),
            method: Method::GET,
            url: Url::parse("http://localhost/api").unwrap(),
            path: path.to_string(),
        }
    }

    fn unauthorized() -> Result<Response, ClientError> {
        Err(ClientError::Unauthorized {
            status: 401,
            message: None,
        })
    }

    #[test]
    fn test_bearer_header_is_sensitive() {
        let value = bearer_header("abc").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_bearer_header_rejects_control_chars() {
        assert!(matches!(
            bearer_header("abc\ndef"),
            Err(ClientError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_bearer_auth_attaches_current_token() {
        let auth = BearerAuth::new(logged_in_store());
        let mut req = request();
        auth.on_request(&mut req).unwrap();

        assert_eq!(
            req.headers().get(AUTHORIZATION).unwrap(),
            "Bearer tok.en.value"
        );
    }

    #[test]
    fn test_bearer_auth_without_session_leaves_request() {
        let auth = BearerAuth::new(store());
        let mut req = request();
        auth.on_request(&mut req).unwrap();

        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_auth_follows_logout() {
        let store = logged_in_store();
        let auth = BearerAuth::new(store.clone());
        store.logout();

        let mut req = request();
        auth.on_request(&mut req).unwrap();
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_force_logout_on_401() {
        let store = logged_in_store();
        let cache = QueryCache::default();
        cache.insert("core:/me", serde_json::json!({"id": "u-1"}));
        let nav = Arc::new(MemoryNavigator::new("/employee"));

        let mw = ForceLogoutOnUnauthorized::new(store.clone(), cache.clone(), nav.clone(), "/login");
        let result = mw.on_response(&context("employee", "/attendance"), unauthorized());

        assert!(matches!(result, Err(ClientError::Unauthorized { status: 401, .. })));
        assert!(!store.is_authenticated());
        assert!(cache.is_empty());
        assert_eq!(nav.current(), "/login");
        assert_eq!(nav.hard_loads(), 1);
    }

    #[test]
    fn test_force_logout_renavigates_when_already_logged_out() {
        let nav = Arc::new(MemoryNavigator::new("/employee"));
        let mw = ForceLogoutOnUnauthorized::new(store(), QueryCache::default(), nav.clone(), "/login");

        let _ = mw.on_response(&context("core", "/me"), unauthorized());
        let _ = mw.on_response(&context("core", "/me"), unauthorized());

        assert_eq!(nav.hard_loads(), 2);
        assert_eq!(nav.current(), "/login");
    }

    #[test]
    fn test_force_logout_ignores_other_errors() {
        let store = logged_in_store();
        let nav = Arc::new(MemoryNavigator::new("/employee"));
        let mw = ForceLogoutOnUnauthorized::new(store.clone(), QueryCache::default(), nav.clone(), "/login");

        let result = mw.on_response(
            &context("core", "/me"),
            Err(ClientError::Http {
                status: 403,
                message: None,
            }),
        );

        assert!(matches!(result, Err(ClientError::Http { status: 403, .. })));
        assert!(store.is_authenticated());
        assert_eq!(nav.hard_loads(), 0);
    }

    #[test]
    fn test_exempt_login_endpoint() {
        let store = logged_in_store();
        let nav = Arc::new(MemoryNavigator::new("/login"));
        let mw = ForceLogoutOnUnauthorized::new(store.clone(), QueryCache::default(), nav.clone(), "/login")
            .with_exemption("core", "/auth/login");

        let _ = mw.on_response(&context("core", "/auth/login"), unauthorized());
        assert!(store.is_authenticated());
        assert_eq!(nav.hard_loads(), 0);

        // 같은 경로라도 다른 클라이언트는 예외가 아님
        let _ = mw.on_response(&context("employee", "/auth/login"), unauthorized());
        assert!(!store.is_authenticated());
        assert_eq!(nav.hard_loads(), 1);
    }
}
