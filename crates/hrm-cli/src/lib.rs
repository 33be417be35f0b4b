//! HRM 포털 CLI.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 로그인/로그아웃 (세션은 설정된 저장 디렉토리에 유지)
//! - 현재 세션 확인
//! - 역할 기반 라우트 판정
//! - 인증된 API 조회

pub mod commands;

use std::sync::Arc;

use hrm_client::ClientContext;
use hrm_core::{AppConfig, CoreResult, MemoryNavigator};

/// 설정 파일을 로드합니다. 경로가 없으면 기본 경로를 사용합니다.
pub fn load_config(path: Option<&str>) -> CoreResult<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    Ok(config)
}

/// 명령 실행에 필요한 컨텍스트와 내비게이터.
#[derive(Debug)]
pub struct Runtime {
    pub ctx: ClientContext,
    pub navigator: Arc<MemoryNavigator>,
}

impl Runtime {
    /// 설정으로부터 파일 저장소 기반 런타임을 만듭니다.
    ///
    /// # Errors
    ///
    /// 세션 저장소를 준비할 수 없거나 API 기본 URL이 유효하지 않으면
    /// [`hrm_core::CoreError`].
    pub fn from_config(config: AppConfig) -> CoreResult<Self> {
        let navigator = Arc::new(MemoryNavigator::default());
        let ctx = ClientContext::from_config(config, navigator.clone(), navigator.clone())?;
        Ok(Self { ctx, navigator })
    }

    /// 현재 위치.
    pub fn location(&self) -> String {
        hrm_core::Navigator::current(self.navigator.as_ref())
    }
}
