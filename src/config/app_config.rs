//! 애플리케이션 및 서버 설정 관리 모듈
//!
//! 실행 환경, 서버 바인딩, 애플리케이션 정보, 에러 출력 관련 설정을 관리합니다.

use std::env;

use log::{error, info};

/// 애플리케이션 실행 환경
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 개발 환경
    Development,
    /// 테스트 환경
    Test,
    /// 스테이징 환경
    Staging,
    /// 프로덕션 환경
    Production,
}

impl Environment {
    /// 현재 실행 환경을 감지합니다.
    ///
    /// `ENVIRONMENT` 또는 `NODE_ENV` 환경 변수를 확인하며,
    /// 설정되지 않은 경우 `Production`을 기본값으로 사용합니다.
    pub fn current() -> Self {
        let raw = env::var("ENVIRONMENT")
            .or_else(|_| env::var("NODE_ENV"))
            .unwrap_or_else(|_| "production".to_string());

        Self::from_str(&raw)
    }

    /// 문자열에서 Environment를 생성합니다. (대소문자 무관)
    ///
    /// 알 수 없는 값인 경우 `Production`을 반환합니다.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" | "testing" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Production,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 서버 바인딩 설정
pub struct ServerConfig;

impl ServerConfig {
    /// 서버가 바인딩할 포트 (`PORT`, 기본값 8080)
    pub fn port() -> u16 {
        Self::parse_port(env::var("PORT").ok().as_deref())
    }

    /// 서버가 바인딩할 호스트 주소 (`HOST`, 기본값 "127.0.0.1")
    pub fn host() -> String {
        env::var("HOST")
            .ok()
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| "127.0.0.1".to_string())
    }

    /// `host:port` 형태의 바인딩 주소
    pub fn bind_address() -> String {
        format!("{}:{}", Self::host(), Self::port())
    }

    fn parse_port(raw: Option<&str>) -> u16 {
        raw.and_then(|value| value.trim().parse().ok()).unwrap_or(8080)
    }
}

/// 애플리케이션 정보 (서버 배너에 사용)
pub struct AppInfo;

impl AppInfo {
    /// 애플리케이션 이름 (`APP_NAME`, 기본값 "Application")
    pub fn name() -> String {
        non_empty_var("APP_NAME").unwrap_or_else(|| "Application".to_string())
    }

    /// 애플리케이션 버전 (`APP_VERSION`, 기본값 "not provided")
    pub fn version() -> String {
        non_empty_var("APP_VERSION").unwrap_or_else(|| "not provided".to_string())
    }
}

/// 에러 출력 설정
pub struct ErrorConfig;

impl ErrorConfig {
    /// 에러 원인 체인 로그 출력 여부 (`SHOW_STACK_TRACE`)
    pub fn show_stack_trace() -> bool {
        Self::show_stack_trace_for(&Environment::current(), env::var("SHOW_STACK_TRACE").ok().as_deref())
    }

    /// 환경과 원시 설정값으로 출력 여부를 결정합니다.
    ///
    /// 설정값이 없거나 해석할 수 없으면 개발 환경에서만 `true`입니다.
    pub fn show_stack_trace_for(env: &Environment, raw: Option<&str>) -> bool {
        match raw.map(|value| value.trim().to_lowercase()).as_deref() {
            Some("true") | Some("1") | Some("yes") => true,
            Some("false") | Some("0") | Some("no") => false,
            _ => *env == Environment::Development,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// 환경별 설정 파일을 로드합니다
///
/// PROFILE 환경변수에 따라 적절한 .env 파일을 로드합니다.
///
/// # Environment Variables
///
/// * `PROFILE=dev` - .env.dev 파일 로드 (기본값)
/// * `PROFILE=prod` - .env.prod 파일 로드
/// * 기타 - 기본 .env 파일 로드
pub fn load_env_file() {
    let profile = env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            dotenv::dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}
