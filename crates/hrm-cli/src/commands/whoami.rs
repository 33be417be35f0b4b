//! 현재 세션 확인.

use anyhow::Result;
use chrono::Utc;

use hrm_session::decode_token;

use crate::Runtime;

pub fn run(rt: &Runtime) -> Result<()> {
    let session = rt.ctx.store().snapshot();

    let Some(user) = session.user().filter(|_| session.is_authenticated()) else {
        println!("로그인되어 있지 않습니다.");
        return Ok(());
    };

    let roles: Vec<&str> = user.roles.iter().map(|r| r.as_tag()).collect();
    println!("사용자: {}", user.id);
    if let Some(email) = &user.email {
        println!("이메일: {}", email);
    }
    if let Some(name) = &user.name {
        println!("이름: {}", name);
    }
    println!("역할: {}", roles.join(", "));

    // 표시용. 만료 여부는 서버의 401 응답으로만 판단합니다.
    let expiry = session
        .token()
        .and_then(|token| decode_token(token).ok())
        .and_then(|claims| claims.expires_at());
    if let Some(expires_at) = expiry {
        let note = if expires_at <= Utc::now() { " (만료됨)" } else { "" };
        println!("토큰 만료: {}{}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"), note);
    }

    Ok(())
}
