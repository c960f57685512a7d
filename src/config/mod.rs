//! # Configuration Module
//!
//! 환경 변수 기반의 설정값들을 중앙집중식으로 관리합니다.
//!
//! ## 모듈 구성
//!
//! - [`app_config`] - 실행 환경, 서버, 애플리케이션 정보, 에러 출력 설정
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::config::{AppInfo, Environment, ServerConfig};
//!
//! load_env_file();
//!
//! let env = Environment::current();
//! println!("{} v{} on {}", AppInfo::name(), AppInfo::version(), ServerConfig::bind_address());
//! ```
//!
//! ## 환경 변수
//!
//! ```bash
//! # 프로필 (.env.dev / .env.prod)
//! export PROFILE="dev"
//!
//! # 서버 설정
//! export HOST="127.0.0.1"
//! export PORT="8080"
//!
//! # 애플리케이션 정보
//! export APP_NAME="my-app"
//! export APP_VERSION="1.0.0"
//!
//! # 환경 / 에러 출력
//! export ENVIRONMENT="development"
//! export SHOW_STACK_TRACE="true"
//! ```

pub mod app_config;

pub use app_config::*;
