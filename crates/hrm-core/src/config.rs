//! 설정 관리.
//!
//! 기본값 → TOML 파일 → `HRM__` 접두사 환경 변수 순으로 덮어씁니다.
//!
//! ```text
//! HRM__API__CORE_BASE_URL=https://hr.example.com/api
//! HRM__STORAGE__DIR=/var/lib/hrm
//! HRM__AUTH__UNAUTHORIZED_STATUSES=401,419
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::{LogConfig, LogFormat};
use crate::routes::{LOGIN, ROOT};

/// 설정 파일 기본 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 백엔드 API 설정
    pub api: ApiConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 세션 저장소 설정
    pub storage: StorageConfig,
    /// 조회 캐시 설정
    pub cache: CacheConfig,
    /// 라우팅 설정
    pub routing: RoutingConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 백엔드 API 설정.
///
/// 코어 API와 직원 마이크로서비스는 서로 다른 기본 URL을 가집니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 코어 API 기본 URL
    pub core_base_url: String,
    /// 직원 서비스 기본 URL
    pub employee_base_url: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            core_base_url: "http://localhost:8080/api".to_string(),
            employee_base_url: "http://localhost:8081/api".to_string(),
            timeout_secs: 30,
        }
    }
}

/// 인증 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// 코어 API의 로그인 엔드포인트 경로
    pub login_path: String,
    /// 세션 만료로 취급할 HTTP 상태 코드
    pub unauthorized_statuses: Vec<u16>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: "/auth/login".to_string(),
            unauthorized_statuses: vec![401],
        }
    }
}

/// 세션 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 저장 디렉토리
    pub dir: String,
    /// 세션 스냅샷 키
    pub session_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: ".hrm".to_string(),
            session_key: "auth-storage".to_string(),
        }
    }
}

/// 조회 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 캐시 TTL (초)
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 300 }
    }
}

/// 라우팅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// 인증 경계 라우트
    pub login_route: String,
    /// 필요한 역할이 없는 인증 사용자를 보낼 라우트
    pub default_landing: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            login_route: LOGIN.to_string(),
            default_landing: ROOT.to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// tracing 초기화용 설정으로 변환.
    ///
    /// 알 수 없는 형식은 `pretty`로 처리합니다.
    pub fn to_log_config(&self) -> LogConfig {
        let format = self.format.parse().unwrap_or(LogFormat::Pretty);
        LogConfig::new(self.level.clone()).with_format(format)
    }
}

impl AppConfig {
    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError>
    {
        let defaults = AppConfig::default();
        config::Config::builder()
            .set_default("api.core_base_url", defaults.api.core_base_url)?
            .set_default("api.employee_base_url", defaults.api.employee_base_url)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("storage.dir", defaults.storage.dir)?
            .set_default("storage.session_key", defaults.storage.session_key)
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("HRM")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("auth.unauthorized_statuses")
            .try_parsing(true)
    }

    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없어도 에러가 아니며, 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = Self::builder()?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(Self::environment())
            .build()?;
        config.try_deserialize()
    }

    /// 기본 경로([`DEFAULT_CONFIG_PATH`])에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH)
    }
}
