//! 로그인부터 역할 기반 라우팅, 로그아웃까지의 전체 흐름.

mod common;

use serde_json::json;

use hrm_client::{Credentials, LoginError, LoginState};
use hrm_core::{Navigator, NavigationKind, Role};
use hrm_session::TokenError;

use common::{harness, signed_token, token_body, token_with_raw_payload};

async fn login_endpoint(server: &mut mockito::ServerGuard, status: usize, body: String) -> mockito::Mock {
    server
        .mock("POST", "/auth/login")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_admin_login_then_admin_route_then_logout() {
    let mut core = mockito::Server::new_async().await;
    let _m = login_endpoint(
        &mut core,
        200,
        token_body(&signed_token("adm-1", &["ADMIN"])).to_string(),
    )
    .await;
    let h = harness(&core.url(), "http://127.0.0.1:9");

    let user = h
        .ctx
        .login_flow()
        .submit(&Credentials::new("adm-1@corp.kr", "pw"))
        .await
        .unwrap();
    assert!(user.has_role(Role::Admin));
    assert_eq!(h.ctx.store().snapshot().user(), Some(&user));
    assert_eq!(h.nav.current(), "/");

    // 루트는 역할별 랜딩으로
    let landing = h.ctx.navigate("/").unwrap();
    assert_eq!(landing.location, "/admin");

    let outcome = h.ctx.navigate("/admin/employees").unwrap();
    assert_eq!(outcome.location, "/admin/employees");
    assert_eq!(outcome.redirects, 0);

    // ADMIN은 MANAGER 전용 화면에 들어갈 수 없음
    let denied = h.ctx.navigate("/manager/approvals").unwrap();
    assert_eq!(denied.location, "/admin");

    assert!(h.ctx.logout_flow().logout());
    assert_eq!(h.nav.current(), "/login");

    let after = h.ctx.navigate("/admin/employees").unwrap();
    assert_eq!(after.location, "/login");
    let last = h.nav.events().pop().unwrap();
    assert_eq!(last.kind, NavigationKind::Replace);
}

#[tokio::test]
async fn test_unparseable_payload_leaves_session_untouched() {
    let mut core = mockito::Server::new_async().await;
    let _m = login_endpoint(
        &mut core,
        200,
        token_body(&token_with_raw_payload("this is not json")).to_string(),
    )
    .await;
    let h = harness(&core.url(), "http://127.0.0.1:9");

    let err = h
        .ctx
        .login_flow()
        .submit(&Credentials::new("kim@corp.kr", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Decode(TokenError::InvalidPayload(_))));
    assert!(matches!(h.ctx.login_flow().state(), LoginState::Failure(_)));
    assert_eq!(h.ctx.store().snapshot(), hrm_core::Session::empty());
    assert_eq!(h.storage.raw("auth-storage"), None);
    assert_eq!(h.nav.history(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_rejected_credentials_stay_on_login() {
    let mut core = mockito::Server::new_async().await;
    let _m = login_endpoint(
        &mut core,
        401,
        json!({"message": "이메일 또는 비밀번호를 확인해 주세요"}).to_string(),
    )
    .await;
    let h = harness(&core.url(), "http://127.0.0.1:9");

    let err = h
        .ctx
        .login_flow()
        .submit(&Credentials::new("kim@corp.kr", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Rejected { status: 401, .. }));
    assert_eq!(
        h.ctx.login_flow().state(),
        LoginState::Failure("이메일 또는 비밀번호를 확인해 주세요".to_string())
    );
    // 로그인 엔드포인트의 401은 강제 로그아웃 대상이 아님
    assert_eq!(h.nav.hard_loads(), 0);
    assert_eq!(h.nav.current(), "/login");
}

#[tokio::test]
async fn test_network_failure_during_login() {
    // 닫힌 포트
    let h = harness("http://127.0.0.1:9", "http://127.0.0.1:9");

    let err = h
        .ctx
        .login_flow()
        .submit(&Credentials::new("kim@corp.kr", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, LoginError::Network(_)));
    assert!(!h.ctx.store().is_authenticated());
    assert_eq!(
        h.ctx.login_flow().state(),
        LoginState::Failure(err.user_message())
    );
}

#[tokio::test]
async fn test_relogin_applies_new_roles_on_next_navigation() {
    let mut core = mockito::Server::new_async().await;
    let first = login_endpoint(
        &mut core,
        200,
        token_body(&signed_token("emp-1", &["EMPLOYEE"])).to_string(),
    )
    .await;
    let h = harness(&core.url(), "http://127.0.0.1:9");
    let creds = Credentials::new("emp-1@corp.kr", "pw");

    h.ctx.login_flow().submit(&creds).await.unwrap();
    assert_eq!(h.ctx.navigate("/manager").unwrap().location, "/employee");

    first.remove_async().await;
    let _second = login_endpoint(
        &mut core,
        200,
        token_body(&signed_token("emp-1", &["EMPLOYEE", "MANAGER"])).to_string(),
    )
    .await;

    h.ctx.logout_flow().logout();
    h.ctx.login_flow().submit(&creds).await.unwrap();
    assert_eq!(h.ctx.navigate("/manager").unwrap().location, "/manager");
}

#[tokio::test]
async fn test_cached_queries_do_not_survive_logout() {
    let mut core = mockito::Server::new_async().await;
    let _login = login_endpoint(
        &mut core,
        200,
        token_body(&signed_token("adm-1", &["ADMIN"])).to_string(),
    )
    .await;
    let data = core
        .mock("GET", "/employees")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id":"emp-1"}]"#)
        .expect(2)
        .create_async()
        .await;
    let h = harness(&core.url(), "http://127.0.0.1:9");
    let creds = Credentials::new("adm-1@corp.kr", "pw");

    h.ctx.login_flow().submit(&creds).await.unwrap();
    let _: serde_json::Value = h.ctx.core().get_cached("/employees").await.unwrap();
    let _: serde_json::Value = h.ctx.core().get_cached("/employees").await.unwrap();
    assert_eq!(h.ctx.cache().len(), 1);

    h.ctx.logout_flow().logout();
    assert!(h.ctx.cache().is_empty());

    h.ctx.login_flow().submit(&creds).await.unwrap();
    let _: serde_json::Value = h.ctx.core().get_cached("/employees").await.unwrap();

    data.assert_async().await;
}
