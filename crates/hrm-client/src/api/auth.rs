//! 인증 엔드포인트.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

use super::client::ApiClient;

/// 로그인 자격 증명.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// 사용자 식별자 (이메일)
    pub identifier: String,
    pub secret: SecretString,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// 두 필드가 모두 비어 있지 않은지 확인.
    pub fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.secret.expose_secret().is_empty()
    }
}

/// 인증 성공 응답.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// 인증 엔드포인트 추상화.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError>;
}

/// core 서비스의 로그인 엔드포인트를 호출하는 구현.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
    login_path: String,
}

impl HttpAuthApi {
    pub fn new(client: ApiClient, login_path: impl Into<String>) -> Self {
        Self {
            client,
            login_path: login_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthResponse, ClientError> {
        debug!(client = self.client.name(), path = %self.login_path, "Submitting credentials");

        let body = LoginBody {
            email: credentials.identifier.trim(),
            password: credentials.secret.expose_secret(),
        };
        self.client.post(&self.login_path, &body).await
    }
}
