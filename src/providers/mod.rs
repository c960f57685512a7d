//! # Providers
//!
//! 컨테이너 위에서 동작하는 장수명 프로바이더들을 제공합니다.
//!
//! - [`provider_manager`] - 프로바이더 등록/조회 (`ProviderManager`)
//! - [`logger`] - 로깅 협력자 (`LogSink`, `Logger`)
//! - [`env_validator`] - 환경 변수 조회/검증 (`EnvValidator`)

pub mod env_validator;
pub mod logger;
pub mod provider_manager;

pub use env_validator::EnvValidator;
pub use logger::{LogSink, Logger};
pub use provider_manager::ProviderManager;
