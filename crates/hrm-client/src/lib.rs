//! HRM 포털 API 클라이언트 및 인증 플로우.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - [`ApiClient`]: 요청/응답 미들웨어 파이프라인을 가진 HTTP 클라이언트
//! - [`BearerAuth`]: 모든 요청에 `Authorization: Bearer <token>` 부착
//! - [`ForceLogoutOnUnauthorized`]: 401 응답 시 세션 강제 무효화
//! - [`QueryCache`]: 서버 조회 결과 캐시
//! - [`LoginFlow`], [`LogoutFlow`]: 로그인/로그아웃 오케스트레이션
//! - [`ClientContext`]: 위 구성 요소를 하나로 묶는 애플리케이션 컨텍스트
//!
//! 코어 API와 직원 서비스용 클라이언트는 같은 미들웨어 인스턴스를 공유하므로
//! 헤더 형식과 401 처리 규칙이 서로 달라지지 않습니다.

pub mod api;
pub mod cache;
pub mod context;
pub mod error;
pub mod flow;

pub use api::{
    bearer_header, ApiClient, ApiClientBuilder, AuthApi, AuthResponse, BearerAuth, Credentials,
    ForceLogoutOnUnauthorized, HttpAuthApi, RequestMiddleware, ResponseContext,
    ResponseMiddleware, TraceRequests,
};
pub use cache::QueryCache;
pub use context::{ClientContext, CORE_CLIENT, EMPLOYEE_CLIENT};
pub use error::ClientError;
pub use flow::{LoginError, LoginFlow, LoginState, LogoutFlow};
