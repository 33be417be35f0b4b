//! HRM 포털 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 로그인 (비밀번호는 HRM_PASSWORD 환경 변수에서)
//! hrm login -u kim@corp.kr
//!
//! # 현재 세션
//! hrm whoami
//!
//! # 역할 기반 라우트 판정
//! hrm navigate /admin/employees
//!
//! # 직원 서비스 조회
//! hrm get employee /employees/me
//!
//! hrm logout
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use hrm_cli::commands::{get, login, logout, navigate, whoami};
use hrm_cli::{load_config, Runtime};
use hrm_core::init_logging;

#[derive(Parser, Debug)]
#[command(name = "hrm")]
#[command(about = "HRM portal CLI - 세션/권한 코어", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML, 생략 시 config/default.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 로그인하고 세션 저장
    Login {
        /// 사용자 식별자 (이메일)
        #[arg(short = 'u', long)]
        user: String,

        /// 비밀번호 (생략 시 --password-env 환경 변수에서 읽음)
        #[arg(short, long)]
        password: Option<String>,

        /// 비밀번호를 읽을 환경 변수
        #[arg(long, default_value = login::DEFAULT_PASSWORD_ENV)]
        password_env: String,
    },

    /// 세션 삭제
    Logout,

    /// 현재 세션 정보
    Whoami,

    /// 라우트로 이동 (역할 기반 리다이렉트 적용)
    Navigate {
        /// 경로 (예: /admin, /employee/attendance)
        path: String,
    },

    /// 인증된 GET 요청
    Get {
        /// 클라이언트 (core, employee)
        client: String,

        /// 요청 경로 (예: /employees/me)
        path: String,

        /// 조회 캐시 사용
        #[arg(long, default_value = "false")]
        cached: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("설정 로드 실패")?;

    init_logging(config.logging.to_log_config())
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let rt = Runtime::from_config(config).context("클라이언트 컨텍스트 생성 실패")?;

    match cli.command {
        Commands::Login {
            user,
            password,
            password_env,
        } => {
            let password = login::resolve_password(password, &password_env)?;
            login::run(&rt, &user, password).await
        }
        Commands::Logout => logout::run(&rt),
        Commands::Whoami => whoami::run(&rt),
        Commands::Navigate { path } => navigate::run(&rt, &path),
        Commands::Get {
            client,
            path,
            cached,
        } => get::run(&rt, &client, &path, cached).await,
    }
}
