//! # Core Framework Module
//!
//! 의존성 주입 컨테이너의 핵심 기능을 제공하는 모듈입니다.
//!
//! ## 모듈 구성
//!
//! ### [`lifetime`] - Scope Resolver
//! - **Lifetime**: `Singleton` / `Transient` / `RequestScoped`
//! - **bind_to_scope**: 라이프타임 태그 → 스코프 연산 (알 수 없는 태그는 `RequestScoped`)
//!
//! ### [`module`] - Module Builder
//! - **ContainerModule**: 변경 불가능한 바인딩 묶음
//! - **ModuleBuilder**: 서비스 디스크립터 목록 → 모듈
//!
//! ### [`container`] - 바인딩 테이블
//! - **Container**: 라이프타임별 인스턴스 해석, 싱글톤 1회 생성 보장
//! - **RequestScope**: 요청 단위 인스턴스 분리
//!
//! ### [`registry`] - Container Facade
//! - **AppContainer**: 컨테이너 생성, 옵션 조회, 바인딩 진단
//!
//! ### [`errors`] - 에러 처리
//! - **ContainerError**: 구성/해석 단계의 치명적 에러
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use app_composer::core::*;
//!
//! struct Database;
//! struct UserService { db: Arc<Database> }
//!
//! let module = ModuleBuilder::build(
//!     vec![
//!         ServiceDescriptor::new(|_| Ok(Database)).with_lifetime(Lifetime::Singleton),
//!         ServiceDescriptor::new(|r| Ok(UserService {
//!             db: r.get(&ServiceIdentifier::of::<Database>())?,
//!         })),
//!     ],
//!     None,
//! )?;
//!
//! let mut app_container = AppContainer::new(None);
//! let container = app_container.create(vec![module])?;
//!
//! let scope = container.create_request_scope();
//! let users = scope.get::<UserService>(&ServiceIdentifier::of::<UserService>())?;
//! ```
//!
//! ## 트러블슈팅
//!
//! ### 순환 참조 감지
//! ```text
//! ❌ Circular dependency detected for Symbol(UserService)
//! ```
//! **해결**: 서비스 계층 구조를 재설계하여 단방향 의존성으로 변경
//!
//! ### 미등록 타입 에러
//! ```text
//! Provider EmailService not registered
//! ```
//! **해결**: 모듈에 디스크립터를 추가하거나 `autoBindInjectable` 옵션과 `Injectable` 구현 사용

pub mod container;
pub mod descriptor;
pub mod errors;
pub mod identifier;
pub mod lifetime;
pub mod module;
pub mod registry;

pub use container::*;
pub use descriptor::*;
pub use errors::*;
pub use identifier::*;
pub use lifetime::*;
pub use module::*;
pub use registry::*;
