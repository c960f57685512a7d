//! 미들웨어 모듈
//!
//! 순서가 보장되고 중복이 제거된 미들웨어 파이프라인을 조립하고,
//! 조립된 파이프라인을 ActixWeb 요청 처리에 연결합니다.
//!
//! # 구성 요소
//!
//! ### 1. 파이프라인 관리자 (`MiddlewareService`)
//! - 이름 있는 슬롯(`bodyParser`, `cors`, `rateLimiter` ...)을 한 번씩만 설치
//! - 사용자 미들웨어와 경로 그룹 추가
//! - 에러 핸들러 슬롯과 파이프라인 진단 테이블
//!
//! ### 2. 미들웨어 리졸버 (`MiddlewareResolver`)
//! - 문자열 태그 → 미들웨어 유닛
//! - 등록되지 않은 태그는 "기능 비활성화"로 취급
//!
//! ### 3. 실행 미들웨어 (`PipelineMiddleware`)
//! - 요청마다 컨테이너 요청 스코프 생성
//! - 파이프라인 유닛을 삽입 순서대로 실행
//! - 유닛/핸들러 에러를 에러 핸들러로 변환
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! use actix_web::{App, HttpServer};
//! use app_composer::middlewares::{MiddlewareService, PipelineMiddleware};
//!
//! let mut middleware = MiddlewareService::default();
//! middleware.add_body_parser(None);
//! middleware.add_cors(None);
//!
//! let pipeline = PipelineMiddleware::new(container.clone(), &middleware);
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .wrap(pipeline.clone())
//!         .configure(configure_routes)
//! })
//! ```
//!
//! # 미들웨어 실행 순서
//!
//! ```text
//! Request → PipelineMiddleware → [unit 1] → [unit 2] → ... → Handler
//!                                                              │
//! Response ← (에러면 ErrorHandler) ← [unit 1] ← [unit 2] ← ...─┘
//! ```

pub mod builtin;
pub mod options;
pub mod pipeline;
mod pipeline_inner;
pub mod pipeline_middleware;
pub mod resolver;
pub mod service;

pub use builtin::{parse_size_limit, ParsedBody, ParsedCookies, ParsedForm};
pub use options::*;
pub use pipeline::{Middleware, MiddlewareEntry, MiddlewareFuture, MiddlewareUnit, Next, PipelineRow, PipelineUnit};
pub use pipeline_middleware::{request_scope, PipelineMiddleware};
pub use resolver::{MiddlewareFactory, MiddlewareIntegration, MiddlewareResolver};
pub use service::{InstallOutcome, MiddlewareService};
