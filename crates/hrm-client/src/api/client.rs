//! 미들웨어 파이프라인을 가진 API 클라이언트.
//!
//! 요청 처리 순서:
//!
//! ```text
//! build request ─▶ request middleware (등록 순) ─▶ send
//!                                                   │
//! caller ◀── response middleware (등록 순) ◀── 상태 코드 분류
//! ```
//!
//! 응답 미들웨어는 성공과 에러 모두를 받으며, 호출자의 후속 처리보다 먼저 실행됩니다.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::cache::QueryCache;
use crate::error::ClientError;

use super::middleware::{RequestMiddleware, ResponseMiddleware};

/// 응답 미들웨어에 전달되는 요청 정보.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    /// 요청을 보낸 클라이언트 이름 (예: "core", "employee")
    pub client: String,
    pub method: Method,
    pub url: Url,
    /// 기본 URL을 제외한 요청 경로
    pub path: String,
}

/// 서버 에러 페이로드.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

struct ClientInner {
    name: String,
    base_url: String,
    http: Client,
    unauthorized_statuses: HashSet<u16>,
    request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    response_middleware: Vec<Arc<dyn ResponseMiddleware>>,
    cache: Option<QueryCache>,
}

/// API 클라이언트.
///
/// 복제본은 같은 HTTP 연결 풀과 미들웨어를 공유합니다.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("name", &self.inner.name)
            .field("base_url", &self.inner.base_url)
            .field("request_middleware", &self.inner.request_middleware.len())
            .field("response_middleware", &self.inner.response_middleware.len())
            .finish()
    }
}

/// [`ApiClient`] 빌더.
pub struct ApiClientBuilder {
    name: String,
    base_url: String,
    timeout: Duration,
    unauthorized_statuses: HashSet<u16>,
    request_middleware: Vec<Arc<dyn RequestMiddleware>>,
    response_middleware: Vec<Arc<dyn ResponseMiddleware>>,
    cache: Option<QueryCache>,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 세션 만료로 분류할 상태 코드 (기본: 401).
    pub fn unauthorized_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.unauthorized_statuses = statuses.into_iter().collect();
        self
    }

    pub fn request_middleware(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.request_middleware.push(middleware);
        self
    }

    pub fn response_middleware(mut self, middleware: Arc<dyn ResponseMiddleware>) -> Self {
        self.response_middleware.push(middleware);
        self
    }

    pub fn cache(mut self, cache: QueryCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// 클라이언트 생성.
    ///
    /// # Errors
    ///
    /// 기본 URL이 유효하지 않거나 HTTP 클라이언트 생성에 실패하면 [`ClientError::Config`].
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("invalid base url '{}': {}", base_url, e)))?;

        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("HTTP client 생성 실패: {}", e)))?;

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                name: self.name,
                base_url,
                http,
                unauthorized_statuses: self.unauthorized_statuses,
                request_middleware: self.request_middleware,
                response_middleware: self.response_middleware,
                cache: self.cache,
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(name: impl Into<String>, base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            name: name.into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            unauthorized_statuses: HashSet::from([401]),
            request_middleware: Vec::new(),
            response_middleware: Vec::new(),
            cache: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        let raw = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        Url::parse(&raw).map_err(|e| ClientError::Config(format!("invalid url '{}': {}", raw, e)))
    }

    /// 요청 전송.
    ///
    /// 성공이 아닌 상태 코드는 에러로 변환한 뒤 응답 미들웨어를 거쳐 호출자에게
    /// 그대로 전달됩니다. 401로 강제 로그아웃이 일어나도 호출자는 에러를 받습니다.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Response, ClientError> {
        let url = self.url(path)?;

        let mut builder = self.inner.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build().map_err(ClientError::from_reqwest)?;

        for middleware in &self.inner.request_middleware {
            middleware.on_request(&mut request)?;
        }

        let context = ResponseContext {
            client: self.inner.name.clone(),
            method,
            url,
            path: path.to_string(),
        };

        let outcome = match self.inner.http.execute(request).await {
            Ok(response) => self.classify(response).await,
            Err(e) => Err(ClientError::from_reqwest(e)),
        };

        self.inner
            .response_middleware
            .iter()
            .fold(outcome, |outcome, middleware| {
                middleware.on_response(&context, outcome)
            })
    }

    async fn classify(&self, response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(|payload| payload.message.or(payload.error))
            .filter(|m| !m.trim().is_empty());

        let code = status.as_u16();
        if self.inner.unauthorized_statuses.contains(&code) {
            Err(ClientError::Unauthorized {
                status: code,
                message,
            })
        } else {
            Err(ClientError::Http {
                status: code,
                message,
            })
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let bytes = response.bytes().await.map_err(ClientError::from_reqwest)?;
        if bytes.is_empty() {
            return serde_json::from_value(Value::Null).map_err(ClientError::from);
        }
        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.execute(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    /// 캐시를 거치는 GET.
    ///
    /// 캐시가 없는 클라이언트에서는 일반 GET과 같습니다. 요청 도중 캐시가 비워지면
    /// (로그아웃) 응답은 호출자에게만 전달되고 캐시에는 저장되지 않습니다.
    pub async fn get_cached<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let Some(cache) = &self.inner.cache else {
            return self.get(path).await;
        };

        let key = format!("{}:{}", self.inner.name, path);
        if let Some(value) = cache.get(&key) {
            debug!(key = %key, "Query cache hit");
            return serde_json::from_value(value).map_err(ClientError::from);
        }

        let generation = cache.generation();
        let value: Value = self.get(path).await?;
        cache.insert_if_current(key, value.clone(), generation);
        serde_json::from_value(value).map_err(ClientError::from)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::POST, path, Some(&body)).await?;
        Self::decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.execute(Method::PUT, path, Some(&body)).await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }
}
