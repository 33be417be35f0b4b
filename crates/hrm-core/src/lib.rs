//! # HRM Core
//!
//! HRM 포털 클라이언트의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 클라이언트 전반에서 사용되는 기본 타입을 제공합니다:
//! - 역할(Role) 및 사용자 식별 정보
//! - 세션 스냅샷
//! - 라우트 상수 및 내비게이션 인터페이스
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod routes;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use routes::*;
