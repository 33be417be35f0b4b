//! 세션 스냅샷.

use serde::{Deserialize, Serialize};

use super::user::UserIdentity;

/// 현재 인증 상태의 불변 스냅샷.
///
/// `is_authenticated`는 `user`와 `token`이 모두 존재할 때만 `true`입니다.
/// 생성자는 빈 세션과 완전히 인증된 세션만 만들 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user: Option<UserIdentity>,
    token: Option<String>,
    is_authenticated: bool,
}

impl Session {
    /// 인증되지 않은 빈 세션.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 인증된 세션 생성.
    pub fn authenticated(user: UserIdentity, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
            is_authenticated: true,
        }
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// 역직렬화된 스냅샷이 세션 불변식을 만족하는지 확인.
    ///
    /// 빈 토큰 문자열이나 역할이 없는 사용자도 유효하지 않은 것으로 봅니다.
    pub fn is_structurally_valid(&self) -> bool {
        match (&self.user, &self.token, self.is_authenticated) {
            (None, None, false) => true,
            (Some(user), Some(token), true) => !token.is_empty() && !user.roles.is_empty(),
            _ => false,
        }
    }
}
