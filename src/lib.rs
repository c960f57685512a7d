//! 애플리케이션 컴포저
//!
//! ActixWeb 서비스를 위한 의존성 주입 컨테이너와 미들웨어 파이프라인 관리자입니다.
//! 서비스 디스크립터를 모듈로 묶어 컨테이너에 적재하고, 요청 처리 파이프라인을
//! 순서와 중복 제거를 보장하며 조립합니다.
//!
//! # Features
//!
//! - **DI 컨테이너**: 싱글톤 / 트랜지언트 / 요청 스코프 라이프타임
//! - **모듈 빌더**: 디스크립터 목록을 변경 불가능한 바인딩 묶음으로 변환
//! - **프로바이더 관리자**: 장수명 프로바이더 등록과 조회
//! - **미들웨어 파이프라인**: 이름 있는 슬롯, 경로 그룹, 선택적 통합 리졸버
//! - **에러 핸들러**: 일관된 `{code, error}` JSON 에러 응답
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  ServiceDescriptor   │ ← 서비스 타입 + 생성자 + 라이프타임
//! └──────────────────────┘
//!            │ ModuleBuilder
//!            ▼
//! ┌──────────────────────┐
//! │   ContainerModule    │ ← 변경 불가능한 바인딩 묶음
//! └──────────────────────┘
//!            │ AppContainer::create
//!            ▼
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │      Container       │ ───► │   ProviderManager    │
//! └──────────────────────┘      └──────────────────────┘
//!            │ 요청마다 RequestScope
//!            ▼
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │  PipelineMiddleware  │ ◄─── │  MiddlewareService   │ ← 슬롯 / 경로 그룹 / 에러 핸들러
//! └──────────────────────┘      └──────────────────────┘
//!            │
//!            ▼
//!        Route Handler
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! use app_composer::core::{AppContainer, Lifetime, ModuleBuilder, ServiceDescriptor};
//! use app_composer::middlewares::{MiddlewareService, PipelineMiddleware};
//!
//! let module = ModuleBuilder::build(
//!     vec![ServiceDescriptor::new(|_| Ok(Clock)).with_lifetime(Lifetime::Singleton)],
//!     None,
//! )?;
//! let container = AppContainer::new(None).create(vec![module])?;
//!
//! let mut middleware = MiddlewareService::default();
//! middleware.add_body_parser(None);
//! middleware.add_cors(None);
//!
//! let pipeline = PipelineMiddleware::new(container, &middleware);
//! ```

pub mod config;
pub mod core;
pub mod errors;
pub mod middlewares;
pub mod providers;
pub mod utils;
