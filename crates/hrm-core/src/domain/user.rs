//! 인증된 사용자 식별 정보.

use serde::{Deserialize, Serialize};

use super::role::{Role, RoleSet};

/// 세션에 보관되는 사용자 정보.
///
/// 로그인 시점에 토큰 클레임으로부터 한 번만 구성되며 이후 다시 유도하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// 사용자 ID (토큰 subject)
    pub id: String,
    /// 이메일
    #[serde(default)]
    pub email: Option<String>,
    /// 보유 역할
    pub roles: RoleSet,
    /// 표시 이름
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 직책
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// 직급
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl UserIdentity {
    /// 새로운 사용자 정보 생성.
    pub fn new(id: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            id: id.into(),
            email: None,
            roles: roles.into_iter().collect(),
            name: None,
            position: None,
            level: None,
        }
    }

    /// 이메일 설정.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// 특정 역할을 정확히 보유하는지 확인.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// 주어진 역할 중 하나라도 보유하는지 확인.
    pub fn has_any_role<'a>(&self, roles: impl IntoIterator<Item = &'a Role>) -> bool {
        roles.into_iter().any(|r| self.roles.contains(r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role_is_exact_match() {
        let admin = UserIdentity::new("u-1", [Role::Admin]);

        assert!(admin.has_role(Role::Admin));
        assert!(!admin.has_role(Role::Manager));
        assert!(!admin.has_role(Role::Employee));
    }

    #[test]
    fn test_has_any_role() {
        let user = UserIdentity::new("u-2", [Role::Manager, Role::Employee]);

        assert!(user.has_any_role(&[Role::Admin, Role::Manager]));
        assert!(!user.has_any_role(&[Role::Admin]));
        let none: [Role; 0] = [];
        assert!(!user.has_any_role(&none));
    }

    #[test]
    fn test_profile_fields_are_optional_on_the_wire() {
        let json = r#"{"id":"u-3","roles":["EMPLOYEE"]}"#;
        let user: UserIdentity = serde_json::from_str(json).unwrap();

        assert_eq!(user.id, "u-3");
        assert_eq!(user.email, None);
        assert!(user.has_role(Role::Employee));
    }
}
