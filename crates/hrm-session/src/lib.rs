//! 세션 및 권한 부여 코어.
//!
//! # 구성 요소
//!
//! - [`token`]: 베어러 토큰(JWT) 클레임 디코딩 (서명 검증 없음)
//! - [`storage`]: 세션 스냅샷을 보관하는 영속 키-값 저장소
//! - [`store`]: 세션 스토어 - 로그인/로그아웃 변경 및 구독
//! - [`gate`]: 역할 게이트 및 라우트 테이블
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let storage = Arc::new(FileStorage::new(".hrm")?);
//! let store = SessionStore::open(storage, "auth-storage");
//!
//! let claims = decode_token(&token)?;
//! store.login(claims.identity(), token)?;
//!
//! let routes = RouteTable::standard(RoleGate::default());
//! let decision = routes.resolve("/admin", &store.snapshot());
//! ```

pub mod error;
pub mod gate;
pub mod storage;
pub mod store;
pub mod token;

pub use error::{RoutingError, StorageError, TokenError};
pub use gate::{
    landing_for, normalize_path, GateDecision, NavigationOutcome, RequiredRoles, RoleGate,
    RouteTable,
};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
pub use store::SessionStore;
pub use token::{decode_token, TokenClaims};
