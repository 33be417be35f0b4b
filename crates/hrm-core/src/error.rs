//! 클라이언트 공통 에러 타입.

use thiserror::Error;

/// 핵심 에러.
///
/// 애플리케이션 시작 단계(설정 로드, 세션 저장소 준비)의 실패를 표현합니다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
