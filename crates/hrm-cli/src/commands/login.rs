//! 로그인 명령.

use anyhow::{anyhow, bail, Result};
use tracing::info;

use hrm_client::Credentials;
use hrm_core::routes;

use crate::Runtime;

/// 비밀번호를 직접 받지 않았을 때 읽을 기본 환경 변수.
pub const DEFAULT_PASSWORD_ENV: &str = "HRM_PASSWORD";

/// 비밀번호 결정: 인자 → 환경 변수 순.
pub fn resolve_password(password: Option<String>, env_key: &str) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    match std::env::var(env_key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => bail!("비밀번호가 없습니다. --password 또는 {} 환경 변수를 지정하세요", env_key),
    }
}

pub async fn run(rt: &Runtime, identifier: &str, password: String) -> Result<()> {
    let credentials = Credentials::new(identifier, password);

    match rt.ctx.login_flow().submit(&credentials).await {
        Ok(user) => {
            // 루트에서 역할별 랜딩으로 이동
            let landing = rt.ctx.navigate(routes::ROOT)?;
            info!(user_id = %user.id, location = %landing.location, "Logged in");

            let roles: Vec<&str> = user.roles.iter().map(|r| r.as_tag()).collect();
            println!("로그인 성공: {} [{}]", user.id, roles.join(", "));
            println!("이동: {}", landing.location);
            Ok(())
        }
        Err(e) => {
            println!("로그인 실패: {}", e.user_message());
            Err(anyhow!(e))
        }
    }
}
