//! 로그인 흐름: 자격 증명 제출 → 토큰 수신 → 디코딩 → 세션 설정 → 루트로 이동.
//!
//! 실패한 시도는 세션을 건드리지 않습니다. 디코딩 실패도 게스트 세션이 아니라
//! 로그인 실패로 처리합니다.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use hrm_core::{routes, Navigator, UserIdentity};
use hrm_session::{decode_token, SessionStore, TokenError};

use crate::api::{bearer_header, AuthApi, Credentials};
use crate::error::ClientError;

const GENERIC_FAILURE: &str = "로그인에 실패했습니다. 잠시 후 다시 시도해 주세요.";
const REJECTED_FALLBACK: &str = "아이디 또는 비밀번호가 올바르지 않습니다.";
const MISSING_CREDENTIALS: &str = "아이디와 비밀번호를 모두 입력해 주세요.";

/// 로그인 화면 상태.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoginState {
    #[default]
    Idle,
    Submitting,
    Success(UserIdentity),
    /// 사용자에게 보여줄 메시지
    Failure(String),
}

impl LoginState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, LoginState::Submitting)
    }
}

/// 로그인 실패 원인.
#[derive(Debug, Clone, Error)]
pub enum LoginError {
    #[error("Missing credentials")]
    MissingCredentials,

    /// 서버가 자격 증명을 거부함
    #[error("Credentials rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    #[error("Token decode failed: {0}")]
    Decode(#[from] TokenError),

    /// 인증 응답에 토큰이 없거나 형식이 다름
    #[error("Invalid auth response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session storage failed: {0}")]
    Storage(String),

    /// 응답 전에 더 최근의 제출이 시작됨
    #[error("Superseded by a newer submission")]
    Superseded,
}

impl LoginError {
    /// 로그인 화면에 표시할 문구. 서버 메시지가 있으면 그대로 사용합니다.
    pub fn user_message(&self) -> String {
        match self {
            LoginError::MissingCredentials => MISSING_CREDENTIALS.to_string(),
            LoginError::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            LoginError::Rejected { status, .. } if *status < 500 => REJECTED_FALLBACK.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

impl From<ClientError> for LoginError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Unauthorized { status, message } | ClientError::Http { status, message } => {
                LoginError::Rejected { status, message }
            }
            ClientError::Parse(detail) => LoginError::InvalidResponse(detail),
            other => LoginError::Network(other.to_string()),
        }
    }
}

/// 로그인 흐름.
pub struct LoginFlow {
    auth: Arc<dyn AuthApi>,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    state: watch::Sender<LoginState>,
    /// 가장 최근 제출 번호. 늦게 끝난 이전 제출이 화면 상태를 덮어쓰지 않도록 합니다.
    attempt: AtomicU64,
}

impl std::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl LoginFlow {
    pub fn new(auth: Arc<dyn AuthApi>, store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let (state, _rx) = watch::channel(LoginState::Idle);
        Self {
            auth,
            store,
            navigator,
            state,
            attempt: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> LoginState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    fn set_state(&self, attempt: u64, state: LoginState) {
        if self.attempt.load(Ordering::SeqCst) == attempt {
            self.state.send_replace(state);
        }
    }

    /// 자격 증명 제출.
    ///
    /// 성공하면 세션을 설정하고 루트 경로로 이동합니다. 역할별 화면 이동은 라우팅이
    /// 이어서 처리합니다.
    ///
    /// 응답을 기다리는 동안 새 제출이 시작되면 이 제출의 토큰은 버려지고
    /// [`LoginError::Superseded`]를 반환합니다. 세션과 화면 상태는 새 제출만 바꿉니다.
    pub async fn submit(&self, credentials: &Credentials) -> Result<UserIdentity, LoginError> {
        let attempt = self.attempt.fetch_add(1, Ordering::SeqCst) + 1;

        if !credentials.is_complete() {
            let err = LoginError::MissingCredentials;
            self.set_state(attempt, LoginState::Failure(err.user_message()));
            return Err(err);
        }

        self.set_state(attempt, LoginState::Submitting);

        match self.attempt_login(attempt, credentials).await {
            Ok(user) => {
                info!(user_id = %user.id, roles = ?user.roles, "Login succeeded");
                self.set_state(attempt, LoginState::Success(user.clone()));
                self.navigator.push(routes::ROOT);
                Ok(user)
            }
            Err(LoginError::Superseded) => {
                debug!(attempt, "Login response discarded for newer submission");
                Err(LoginError::Superseded)
            }
            Err(err) => {
                warn!(error = %err, "Login failed");
                self.set_state(attempt, LoginState::Failure(err.user_message()));
                Err(err)
            }
        }
    }

    async fn attempt_login(
        &self,
        attempt: u64,
        credentials: &Credentials,
    ) -> Result<UserIdentity, LoginError> {
        let response = self.auth.authenticate(credentials).await?;

        // 디코딩하는 문자열과 저장하는 문자열은 같아야 함
        let token = response.token.trim();
        let claims = decode_token(token)?;
        bearer_header(token).map_err(|e| LoginError::InvalidResponse(e.to_string()))?;

        if self.attempt.load(Ordering::SeqCst) != attempt {
            return Err(LoginError::Superseded);
        }

        let user = claims.identity();
        self.store
            .login(user.clone(), token)
            .map_err(|e| LoginError::Storage(e.to_string()))?;

        Ok(user)
    }
}
