//! 통합 테스트 공용 도우미.

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use hrm_client::ClientContext;
use hrm_core::{AppConfig, MemoryNavigator};
use hrm_session::MemoryStorage;

pub struct Harness {
    pub ctx: ClientContext,
    pub nav: Arc<MemoryNavigator>,
    pub storage: Arc<MemoryStorage>,
}

pub fn harness(core_url: &str, employee_url: &str) -> Harness {
    let mut config = AppConfig::default();
    config.api.core_base_url = core_url.to_string();
    config.api.employee_base_url = employee_url.to_string();

    let nav = Arc::new(MemoryNavigator::new("/login"));
    let storage = Arc::new(MemoryStorage::new());
    let ctx = ClientContext::new(config, storage.clone(), nav.clone(), nav.clone()).unwrap();

    Harness { ctx, nav, storage }
}

/// 서버가 발급하는 것과 같은 형태의 서명된 토큰.
pub fn signed_token(sub: &str, roles: &[&str]) -> String {
    let payload = json!({
        "sub": sub,
        "roles": roles,
        "mail": format!("{}@corp.kr", sub),
        "iat": 1_700_000_000,
        "exp": 1_700_003_600
    });
    encode(
        &Header::default(),
        &payload,
        &EncodingKey::from_secret(b"server-only-secret"),
    )
    .unwrap()
}

/// 페이로드 부분이 JSON이 아닌 토큰.
pub fn token_with_raw_payload(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload);
    format!("{}.{}.c2lnbmF0dXJl", header, body)
}

pub fn token_body(token: &str) -> Value {
    json!({ "token": token })
}
