//! API 클라이언트 에러 타입.

use thiserror::Error;

/// API 호출 에러.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 인증 실패 (세션 만료 또는 자격 증명 거부)
    #[error("Unauthorized ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Unauthorized { status: u16, message: Option<String> },

    /// 그 외 성공이 아닌 HTTP 응답
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    /// 응답 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    Parse(String),

    /// 헤더 값에 사용할 수 없는 문자
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// 잘못된 클라이언트 설정 (기본 URL 등)
    #[error("Config error: {0}")]
    Config(String),
}

impl ClientError {
    /// 세션 무효화 대상 에러인지 확인.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// 재시도 가능한 에러인지 확인.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Network(_) | ClientError::Timeout(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP 상태 코드 (응답을 받은 경우).
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status, .. } | ClientError::Http { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// 서버 에러 페이로드의 `message`.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Unauthorized { message, .. } | ClientError::Http { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}
