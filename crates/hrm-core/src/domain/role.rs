//! 역할 기반 접근 제어에 사용되는 역할 정의.
//!
//! 역할은 계층 구조가 없는 닫힌 열거형입니다. `Admin`이 `Manager` 권한을
//! 자동으로 포함하지 않으며, 비교는 항상 정확한 태그 일치로만 이루어집니다.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// 사용자 역할.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// 관리자 - 인사 데이터 전체 관리
    Admin,
    /// 매니저 - 캠페인 승인 및 팀 관리
    Manager,
    /// 직원 - 본인 프로필, 근태, 보너스 조회
    #[serde(alias = "USER")]
    Employee,
}

/// 사용자가 보유한 역할 집합.
pub type RoleSet = BTreeSet<Role>;

impl Role {
    /// 모든 역할 반환.
    pub fn all() -> [Role; 3] {
        [Role::Admin, Role::Manager, Role::Employee]
    }

    /// 토큰에 기록되는 태그 문자열 반환.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
        }
    }

    /// 태그 문자열에서 역할 파싱.
    ///
    /// `USER`는 `EMPLOYEE`의 이전 명칭으로 허용합니다.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "MANAGER" => Some(Role::Manager),
            "EMPLOYEE" | "USER" => Some(Role::Employee),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_tag())
    }
}
