//! 역할 게이트 및 라우트 테이블.
//!
//! 게이트는 매 내비게이션마다 현재 세션 스냅샷으로 다시 평가하며 결과를 캐시하지
//! 않습니다. 재로그인으로 역할이 바뀌면 다음 내비게이션부터 바로 반영됩니다.
//!
//! 역할 비교는 정확한 태그 일치입니다. `ADMIN`은 `MANAGER` 전용 라우트를
//! 통과하지 못합니다. 여러 역할을 허용하려면 [`RequiredRoles::any`]로 명시합니다.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use hrm_core::{home_for, Navigator, Role, RoleSet, RoutingConfig, Session, ROOT};

use crate::error::RoutingError;

/// 한 번의 내비게이션에서 따라갈 수 있는 최대 리다이렉트 수.
const MAX_REDIRECTS: usize = 5;

/// 라우트 접근에 필요한 역할 집합. 하나라도 보유하면 통과합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredRoles(RoleSet);

impl RequiredRoles {
    /// 단일 역할 요구.
    pub fn one(role: Role) -> Self {
        Self(RoleSet::from([role]))
    }

    /// 여러 역할 중 하나 요구.
    pub fn any(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    pub fn roles(&self) -> &RoleSet {
        &self.0
    }
}

/// 게이트 판정 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// 요청한 콘텐츠 렌더링
    Render,
    /// 다른 라우트로 이동. `replace`면 히스토리 항목을 교체합니다.
    Redirect { to: String, replace: bool },
}

impl GateDecision {
    fn replace_with(to: &str) -> Self {
        GateDecision::Redirect {
            to: to.to_string(),
            replace: true,
        }
    }
}

/// 역할 게이트.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    login_route: String,
    default_landing: String,
}

impl Default for RoleGate {
    fn default() -> Self {
        Self::new(&RoutingConfig::default())
    }
}

impl RoleGate {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            login_route: config.login_route.clone(),
            default_landing: config.default_landing.clone(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    pub fn default_landing(&self) -> &str {
        &self.default_landing
    }

    /// 게이트 판정.
    ///
    /// 1. 인증되지 않음 → 로그인 라우트로 교체 이동
    /// 2. 필요한 역할 없음 → 기본 랜딩 페이지로 교체 이동
    /// 3. 그 외 → 렌더링
    pub fn evaluate(&self, required: &RequiredRoles, session: &Session) -> GateDecision {
        let user = match session.user() {
            Some(user) if session.is_authenticated() => user,
            _ => return GateDecision::replace_with(&self.login_route),
        };

        if user.has_any_role(required.roles()) {
            GateDecision::Render
        } else {
            debug!(
                user_id = %user.id,
                required = ?required.roles(),
                "Role gate denied access"
            );
            GateDecision::replace_with(&self.default_landing)
        }
    }

    /// 판정을 내비게이터에 적용합니다. 렌더링 가능하면 `true`.
    pub fn guard(
        &self,
        required: &RequiredRoles,
        session: &Session,
        navigator: &dyn Navigator,
    ) -> bool {
        match self.evaluate(required, session) {
            GateDecision::Render => true,
            GateDecision::Redirect { to, replace } => {
                if replace {
                    navigator.replace(&to);
                } else {
                    navigator.push(&to);
                }
                false
            }
        }
    }
}

/// 역할 기반 랜딩 라우트.
///
/// 여러 역할을 가진 경우 `ADMIN` → `MANAGER` → `EMPLOYEE` 순으로 선택합니다.
pub fn landing_for(roles: &RoleSet) -> Option<&'static str> {
    Role::all()
        .into_iter()
        .find(|role| roles.contains(role))
        .map(home_for)
}

#[derive(Debug, Clone)]
struct RouteRule {
    prefix: String,
    required: RequiredRoles,
}

impl RouteRule {
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// 내비게이션 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// 최종 위치
    pub location: String,
    /// 따라간 리다이렉트 수
    pub redirects: usize,
}

/// 라우트 접두사별 역할 요구 사항.
///
/// 등록되지 않은 라우트는 공개 라우트입니다. 루트(`/`)는 로그인 상태에 따라
/// 로그인 페이지 또는 역할별 랜딩 페이지로 이동합니다.
#[derive(Debug, Clone)]
pub struct RouteTable {
    gate: RoleGate,
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// 빈 라우트 테이블.
    pub fn new(gate: RoleGate) -> Self {
        Self {
            gate,
            rules: Vec::new(),
        }
    }

    /// 포털 기본 라우트 테이블.
    ///
    /// - `/admin/**`: ADMIN
    /// - `/manager/**`: MANAGER
    /// - `/employee/**`: EMPLOYEE, MANAGER, ADMIN
    pub fn standard(gate: RoleGate) -> Self {
        Self::new(gate)
            .with_rule("/admin", RequiredRoles::one(Role::Admin))
            .with_rule("/manager", RequiredRoles::one(Role::Manager))
            .with_rule(
                "/employee",
                RequiredRoles::any([Role::Employee, Role::Manager, Role::Admin]),
            )
    }

    /// 규칙 추가. 가장 긴 접두사가 우선합니다.
    pub fn with_rule(mut self, prefix: impl Into<String>, required: RequiredRoles) -> Self {
        let prefix = normalize_path(&prefix.into());
        self.rules.push(RouteRule { prefix, required });
        self.rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        self
    }

    pub fn gate(&self) -> &RoleGate {
        &self.gate
    }

    /// 경로에 적용되는 역할 요구 사항. 공개 라우트면 `None`.
    ///
    /// 경로는 [`normalize_path`]를 거친 뒤 비교하므로 대소문자나 중복 `/`로 규칙을
    /// 우회할 수 없습니다.
    pub fn required_for(&self, path: &str) -> Option<&RequiredRoles> {
        let path = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(&path))
            .map(|rule| &rule.required)
    }

    /// 경로 판정.
    pub fn resolve(&self, path: &str, session: &Session) -> GateDecision {
        if normalize_path(path) == ROOT {
            return match session.user() {
                Some(user) if session.is_authenticated() => match landing_for(&user.roles) {
                    Some(home) => GateDecision::replace_with(home),
                    None => GateDecision::replace_with(self.gate.login_route()),
                },
                _ => GateDecision::replace_with(self.gate.login_route()),
            };
        }

        match self.required_for(path) {
            Some(required) => self.gate.evaluate(required, session),
            None => GateDecision::Render,
        }
    }

    /// 경로로 이동하고 리다이렉트를 끝까지 따라갑니다.
    ///
    /// 요청한 경로는 히스토리에 추가(push)하고, 이후 리다이렉트는 모두 교체(replace)
    /// 하므로 뒤로 가기로 차단된 페이지에 돌아오지 않습니다.
    ///
    /// # Errors
    ///
    /// 리다이렉트가 한도를 넘으면 [`RoutingError::RedirectLoop`].
    pub fn navigate(
        &self,
        path: &str,
        session: &Session,
        navigator: &dyn Navigator,
    ) -> Result<NavigationOutcome, RoutingError> {
        navigator.push(path);

        let mut location = path.to_string();
        let mut redirects = 0;
        while redirects <= MAX_REDIRECTS {
            match self.resolve(&location, session) {
                GateDecision::Render => {
                    return Ok(NavigationOutcome {
                        location,
                        redirects,
                    })
                }
                GateDecision::Redirect { to, replace } => {
                    if to == location {
                        break;
                    }
                    if replace {
                        navigator.replace(&to);
                    } else {
                        navigator.push(&to);
                    }
                    location = to;
                    redirects += 1;
                }
            }
        }

        warn!(path = %path, location = %location, hops = redirects, "Redirect loop detected");
        Err(RoutingError::RedirectLoop {
            path: path.to_string(),
            hops: redirects,
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard(RoleGate::default())
    }
}

/// 라우트 비교용 경로 정규화.
///
/// 쿼리와 프래그먼트를 버리고 소문자로 바꾼 뒤, 빈 세그먼트와 `.`을 제거하고
/// `..`은 상위 세그먼트를 지웁니다. 결과는 항상 `/`로 시작하고 끝에 `/`가 없습니다.
///
/// ```rust,ignore
/// assert_eq!(normalize_path("//Admin/./employees/?tab=1"), "/admin/employees");
/// assert_eq!(normalize_path("admin"), "/admin");
/// ```
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let lowered = path[..end].to_lowercase();

    let mut segments: Vec<&str> = Vec::new();
    for segment in lowered.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("{}{}", ROOT, segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hrm_core::{MemoryNavigator, UserIdentity, ADMIN_HOME, EMPLOYEE_HOME, LOGIN, MANAGER_HOME};

    fn session_with(roles: &[Role]) -> Session {
        Session::authenticated(UserIdentity::new("emp-1", roles.iter().copied()), "tok")
    }

    #[test]
    fn test_gate_renders_for_exact_role() {
        let gate = RoleGate::default();
        let decision = gate.evaluate(&RequiredRoles::one(Role::Admin), &session_with(&[Role::Admin]));
        assert_eq!(decision, GateDecision::Render);
    }

    #[test]
    fn test_gate_has_no_role_hierarchy() {
        let gate = RoleGate::default();
        let decision = gate.evaluate(
            &RequiredRoles::one(Role::Manager),
            &session_with(&[Role::Admin]),
        );
        assert_eq!(
            decision,
            GateDecision::Redirect {
                to: "/".to_string(),
                replace: true
            }
        );
    }

    #[test]
    fn test_gate_redirects_anonymous_to_login() {
        let gate = RoleGate::default();
        let decision = gate.evaluate(&RequiredRoles::one(Role::Admin), &Session::empty());
        assert_eq!(
            decision,
            GateDecision::Redirect {
                to: LOGIN.to_string(),
                replace: true
            }
        );
    }

    #[test]
    fn test_gate_uses_configured_landing() {
        let gate = RoleGate::new(&RoutingConfig {
            login_route: "/signin".to_string(),
            default_landing: "/home".to_string(),
        });

        assert_eq!(
            gate.evaluate(&RequiredRoles::one(Role::Admin), &session_with(&[Role::Employee])),
            GateDecision::Redirect {
                to: "/home".to_string(),
                replace: true
            }
        );
        assert_eq!(
            gate.evaluate(&RequiredRoles::one(Role::Admin), &Session::empty()),
            GateDecision::Redirect {
                to: "/signin".to_string(),
                replace: true
            }
        );
    }

    #[test]
    fn test_guard_replaces_history_entry() {
        let gate = RoleGate::default();
        let nav = MemoryNavigator::new(ROOT);
        nav.push("/admin/employees");

        let allowed = gate.guard(&RequiredRoles::one(Role::Admin), &Session::empty(), &nav);

        assert!(!allowed);
        assert_eq!(nav.history(), vec![ROOT.to_string(), LOGIN.to_string()]);
    }

    #[test]
    fn test_landing_for_roles() {
        assert_eq!(landing_for(&RoleSet::from([Role::Employee])), Some(EMPLOYEE_HOME));
        assert_eq!(
            landing_for(&RoleSet::from([Role::Employee, Role::Manager])),
            Some(MANAGER_HOME)
        );
        assert_eq!(
            landing_for(&RoleSet::from([Role::Admin, Role::Manager])),
            Some(ADMIN_HOME)
        );
        assert_eq!(landing_for(&RoleSet::new()), None);
    }

    #[test]
    fn test_required_for_matches_segments() {
        let table = RouteTable::default();

        assert_eq!(
            table.required_for("/admin"),
            Some(&RequiredRoles::one(Role::Admin))
        );
        assert_eq!(
            table.required_for("/admin/campaigns/3?tab=approval"),
            Some(&RequiredRoles::one(Role::Admin))
        );
        assert_eq!(table.required_for("/administrator"), None);
        assert_eq!(table.required_for("/login"), None);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RouteTable::default().with_rule(
            "/admin/reports",
            RequiredRoles::any([Role::Admin, Role::Manager]),
        );

        let manager = session_with(&[Role::Manager]);
        assert_eq!(table.resolve("/admin/reports/q1", &manager), GateDecision::Render);
        assert!(matches!(
            table.resolve("/admin/employees", &manager),
            GateDecision::Redirect { .. }
        ));
    }

    #[test]
    fn test_root_redirects_by_role() {
        let table = RouteTable::default();

        assert_eq!(
            table.resolve("/", &session_with(&[Role::Manager])),
            GateDecision::Redirect {
                to: MANAGER_HOME.to_string(),
                replace: true
            }
        );
        assert_eq!(
            table.resolve("/", &Session::empty()),
            GateDecision::Redirect {
                to: LOGIN.to_string(),
                replace: true
            }
        );
    }

    #[test]
    fn test_navigate_follows_redirects() {
        let table = RouteTable::default();
        let nav = MemoryNavigator::new(LOGIN);

        let outcome = table
            .navigate("/admin", &session_with(&[Role::Employee]), &nav)
            .unwrap();

        assert_eq!(outcome.location, EMPLOYEE_HOME);
        assert_eq!(outcome.redirects, 2);
        assert_eq!(
            nav.history(),
            vec![LOGIN.to_string(), EMPLOYEE_HOME.to_string()]
        );
    }

    #[test]
    fn test_navigate_detects_redirect_loop() {
        let gate = RoleGate::new(&RoutingConfig {
            login_route: LOGIN.to_string(),
            default_landing: "/admin".to_string(),
        });
        let table = RouteTable::standard(gate);
        let nav = MemoryNavigator::default();

        let result = table.navigate("/manager", &session_with(&[Role::Employee]), &nav);
        assert!(matches!(result, Err(RoutingError::RedirectLoop { .. })));
    }

    #[test]
    fn test_public_routes_render() {
        let table = RouteTable::default();
        assert_eq!(table.resolve("/login", &Session::empty()), GateDecision::Render);
        assert_eq!(table.resolve("/notices", &Session::empty()), GateDecision::Render);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("admin"), "/admin");
        assert_eq!(normalize_path("/admin/"), "/admin");
        assert_eq!(normalize_path("//Admin//employees?tab=1#top"), "/admin/employees");
        assert_eq!(normalize_path("/./admin"), "/admin");
        assert_eq!(normalize_path("/employee/../admin"), "/admin");
        assert_eq!(normalize_path("/../../admin"), "/admin");
    }

    #[test]
    fn test_path_variants_hit_gated_rule() {
        let table = RouteTable::default();
        let login = GateDecision::Redirect {
            to: LOGIN.to_string(),
            replace: true,
        };

        for path in [
            "/admin",
            "/admin/",
            "/ADMIN",
            "/Admin/employees",
            "//admin",
            "/./admin",
            "admin",
            "/employee/../admin",
            "/admin?x=1",
        ] {
            assert_eq!(table.resolve(path, &Session::empty()), login, "{path}");
            assert_eq!(
                table.required_for(path),
                Some(&RequiredRoles::one(Role::Admin)),
                "{path}"
            );
        }

        // 다른 역할도 같은 경로 변형으로 우회하지 못함
        let employee = session_with(&[Role::Employee]);
        assert!(matches!(
            table.resolve("//Manager/approvals", &employee),
            GateDecision::Redirect { .. }
        ));
    }

    #[test]
    fn test_rule_prefix_is_normalized() {
        let table = RouteTable::new(RoleGate::default())
            .with_rule("Reports/", RequiredRoles::one(Role::Manager));

        assert_eq!(
            table.required_for("/reports/q1"),
            Some(&RequiredRoles::one(Role::Manager))
        );
        assert_eq!(table.required_for("/REPORTS"), Some(&RequiredRoles::one(Role::Manager)));
    }
}
