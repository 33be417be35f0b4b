//! 세션 코어 에러 타입.

use thiserror::Error;

/// 토큰 디코딩 에러.
///
/// 어떤 경우든 로그인 실패로 취급하며, 게스트 세션으로 대체하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// 세 부분(header.payload.signature) 구조가 아님
    #[error("잘못된 토큰 형식: {0}")]
    Malformed(String),

    /// 페이로드가 유효한 JSON 객체가 아님
    #[error("토큰 페이로드를 해석할 수 없습니다: {0}")]
    InvalidPayload(String),

    /// 필수 클레임 누락
    #[error("필수 클레임 누락: {0}")]
    MissingClaim(String),

    /// 인식 가능한 역할이 하나도 없음
    #[error("토큰에 인식 가능한 역할이 없습니다")]
    NoRecognizedRole,
}

/// 세션 저장소 에러.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("저장소 I/O 실패: {0}")]
    Io(#[from] std::io::Error),

    #[error("세션 직렬화 실패: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("잘못된 저장소 키: {0}")]
    InvalidKey(String),
}

/// 라우팅 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    #[error("리다이렉트 루프 감지: {path} ({hops}회 이동 후)")]
    RedirectLoop { path: String, hops: usize },
}

impl From<StorageError> for hrm_core::CoreError {
    fn from(err: StorageError) -> Self {
        hrm_core::CoreError::Storage(err.to_string())
    }
}
