//! 베어러 토큰 디코딩.
//!
//! 토큰의 클레임 세그먼트만 해석합니다. 서명 검증은 토큰을 발급하고 이후 모든
//! 요청에서 재검증하는 서버에 위임하며, 클라이언트는 네트워크 호출 없이 동작합니다.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use hrm_core::{Role, RoleSet, UserIdentity};

use crate::error::TokenError;

/// 토큰 클레임.
///
/// `roles`는 토큰의 역할 클레임을 그대로 옮긴 문자열 배열입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 역할 태그
    pub roles: Vec<String>,
    /// 이메일
    #[serde(default, alias = "email", skip_serializing_if = "Option::is_none")]
    pub mail: Option<String>,
    /// Issued At (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiration (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl TokenClaims {
    /// 인식 가능한 역할만 추린 집합.
    pub fn known_roles(&self) -> RoleSet {
        self.roles
            .iter()
            .filter_map(|tag| {
                let role = Role::parse(tag);
                if role.is_none() {
                    tracing::warn!(role = %tag, "Ignoring unknown role tag in token");
                }
                role
            })
            .collect()
    }

    /// 세션에 보관할 사용자 정보 구성.
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.sub.clone(),
            email: self.mail.clone(),
            roles: self.known_roles(),
            name: self.name.clone(),
            position: self.position.clone(),
            level: self.level.clone(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|ts| Utc.timestamp_opt(ts, 0).single())
    }

    /// 주어진 시각 기준으로 만료되었는지 확인.
    ///
    /// `exp`가 없으면 만료되지 않은 것으로 봅니다. 세션 무효화는 서버의 401
    /// 응답으로만 일어나며, 이 값은 진단 출력에만 사용됩니다.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp.map(|exp| now.timestamp() >= exp).unwrap_or(false)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

fn claims_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::from(["sub".to_string()]);
    validation
}

/// 토큰 디코딩.
///
/// # Errors
///
/// - 세 부분 구조가 아니거나 헤더를 해석할 수 없으면 [`TokenError::Malformed`]
/// - 페이로드가 JSON 객체가 아니면 [`TokenError::InvalidPayload`]
/// - `sub` 또는 `roles`가 없으면 [`TokenError::MissingClaim`]
/// - 역할이 비어 있거나 모두 알 수 없는 태그면 [`TokenError::NoRecognizedRole`]
pub fn decode_token(token: &str) -> Result<TokenClaims, TokenError> {
    let token = token.trim();
    let segments = token.split('.').count();
    if segments != 3 {
        return Err(TokenError::Malformed(format!(
            "expected 3 segments, found {}",
            segments
        )));
    }

    let data = decode::<Value>(token, &DecodingKey::from_secret(&[]), &claims_validation())
        .map_err(|e| match e.kind() {
            ErrorKind::MissingRequiredClaim(claim) => TokenError::MissingClaim(claim.clone()),
            ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                TokenError::InvalidPayload(e.to_string())
            }
            _ => TokenError::Malformed(e.to_string()),
        })?;

    let payload = match data.claims {
        Value::Object(map) => map,
        other => {
            return Err(TokenError::InvalidPayload(format!(
                "expected JSON object, found {}",
                other
            )))
        }
    };

    if !payload.contains_key("roles") {
        return Err(TokenError::MissingClaim("roles".to_string()));
    }

    let claims: TokenClaims = serde_json::from_value(Value::Object(payload))
        .map_err(|e| TokenError::InvalidPayload(e.to_string()))?;

    if claims.known_roles().is_empty() {
        return Err(TokenError::NoRecognizedRole);
    }

    Ok(claims)
}
