//! # App Container - 컨테이너 파사드
//!
//! 컨테이너 생성, 옵션 관리, 모듈 로딩을 담당하는 상위 API입니다.
//! 전역 정적 컨테이너 대신 `AppContainer`가 만든 `Arc<Container>`를
//! Provider Registry와 서버 어댑터에 명시적으로 전달합니다.
//!
//! ## 동작 순서
//!
//! ```text
//! 1. AppContainer::new(options)
//!    └─ 옵션 병합 (defaultScope, autoBindInjectable, skipBaseClassChecks)
//!
//! 2. AppContainer::create(modules)
//!    ├─ 모든 모듈 검증 (대상 없는 바인딩, 식별자 충돌)
//!    ├─ 실패 시 컨테이너를 반환하지 않음 (원자적)
//!    └─ 성공 시 Arc<Container> 보관 및 반환
//!
//! 3. 서버 어댑터 / ProviderManager
//!    └─ Arc<Container> 공유
//! ```
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! let mut app_container = AppContainer::new(None);
//! let container = app_container.create(vec![user_module, auth_module])?;
//!
//! app_container.view_container_bindings()?;
//! ```

use std::sync::Arc;

use crate::core::container::{BindingInfo, Container, ContainerOptions};
use crate::core::errors::{ContainerError, ContainerResult};
use crate::core::module::ContainerModule;
use crate::utils::display_terminal::{print_boxed_title, print_step_complete, print_step_start, print_table};

/// 애플리케이션 컨테이너 파사드
#[derive(Debug, Default)]
pub struct AppContainer {
    options: ContainerOptions,
    container: Option<Arc<Container>>,
}

impl AppContainer {
    /// 옵션으로 파사드를 생성합니다. `None`이면 기본 옵션을 사용합니다.
    pub fn new(options: Option<ContainerOptions>) -> Self {
        Self {
            options: options.unwrap_or_default(),
            container: None,
        }
    }

    /// 모듈을 로드한 컨테이너를 생성합니다.
    ///
    /// # Arguments
    ///
    /// * `modules` - 로드할 모듈 목록 (소유권 이동, 한 번만 소비됨)
    ///
    /// # Errors
    ///
    /// * `ContainerError::InvalidModule` - 로드할 수 없는 모듈이 있는 경우.
    ///   이 경우 어떤 컨테이너도 보관/반환되지 않습니다.
    pub fn create(&mut self, modules: Vec<ContainerModule>) -> ContainerResult<Arc<Container>> {
        print_step_start(1, "Loading container modules");

        let module_count = modules.len();
        let container = Container::new(self.options.clone());
        if let Err(error) = container.load(modules) {
            log::error!(target: "app-container", "{}", error);
            return Err(error);
        }

        print_step_complete(1, "Container modules loaded", module_count);

        let container = Arc::new(container);
        self.container = Some(container.clone());
        Ok(container)
    }

    /// 생성된 컨테이너의 옵션을 반환합니다.
    ///
    /// # Errors
    ///
    /// * `ContainerError::NotInitialized` - `create` 호출 전
    pub fn get_container_options(&self) -> ContainerResult<ContainerOptions> {
        self.container()
            .map(|container| container.options().clone())
    }

    /// 생성된 컨테이너
    pub fn container(&self) -> ContainerResult<&Arc<Container>> {
        self.container.as_ref().ok_or(ContainerError::NotInitialized)
    }

    /// 바인딩 진단 테이블을 출력하고 행 목록을 반환합니다.
    ///
    /// 해석 동작에는 아무 영향을 주지 않는 읽기 전용 연산입니다.
    ///
    /// Output:
    /// ```text
    /// ╔══════════════════════════════════════════════════╗
    /// ║                CONTAINER BINDINGS                ║
    /// ╚══════════════════════════════════════════════════╝
    /// Service Identifier | Scope     | Type     | Cache
    /// Symbol(Database)   | Singleton | Instance | Yes
    /// ```
    pub fn view_container_bindings(&self) -> ContainerResult<Vec<BindingInfo>> {
        let rows = self.container()?.bindings();

        print_boxed_title("CONTAINER BINDINGS");
        print_table(
            &["Service Identifier", "Scope", "Type", "Cache"],
            rows.iter()
                .map(|row| {
                    vec![
                        row.identifier.clone(),
                        row.scope.to_string(),
                        row.kind.to_string(),
                        if row.has_cache { "Yes" } else { "No" }.to_string(),
                    ]
                })
                .collect(),
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::descriptor::ServiceDescriptor;
    use crate::core::identifier::ServiceIdentifier;
    use crate::core::lifetime::Lifetime;
    use crate::core::module::ModuleBuilder;

    struct MockService;

    fn mock_module() -> ContainerModule {
        ContainerModule::new(|binder| {
            binder.bind(ServiceIdentifier::named("MockService")).to_constant_value(());
        })
    }

    #[test]
    fn test_create_with_default_options() {
        let mut app_container = AppContainer::new(None);
        let container = app_container.create(vec![mock_module()]).unwrap();

        assert!(container.options().auto_bind_injectable);
        assert_eq!(container.options().default_scope, Lifetime::RequestScoped);
        assert_eq!(container.options().skip_base_class_checks, None);
    }

    #[test]
    fn test_create_with_empty_modules() {
        let mut app_container = AppContainer::new(None);
        let container = app_container.create(Vec::new()).unwrap();
        assert!(container.is_empty());
    }

    #[test]
    fn test_custom_options_are_kept() {
        let mut app_container = AppContainer::new(Some(ContainerOptions {
            default_scope: Lifetime::Singleton,
            auto_bind_injectable: false,
            skip_base_class_checks: Some(true),
        }));
        app_container.create(vec![mock_module()]).unwrap();

        let options = app_container.get_container_options().unwrap();
        assert_eq!(options.default_scope, Lifetime::Singleton);
        assert!(!options.auto_bind_injectable);
        assert_eq!(options.skip_base_class_checks, Some(true));
    }

    #[test]
    fn test_options_before_create_is_not_initialized() {
        let app_container = AppContainer::new(None);
        assert_eq!(
            app_container.get_container_options().unwrap_err(),
            ContainerError::NotInitialized
        );
        assert!(app_container.view_container_bindings().is_err());
    }

    #[test]
    fn test_create_fails_atomically() {
        let mut app_container = AppContainer::new(None);
        let dangling = ContainerModule::new(|binder| {
            binder.bind(ServiceIdentifier::named("NotAClass"));
        });

        let result = app_container.create(vec![mock_module(), dangling]);

        assert!(matches!(result, Err(ContainerError::InvalidModule(_))));
        assert_eq!(
            app_container.get_container_options().unwrap_err(),
            ContainerError::NotInitialized
        );
    }

    #[test]
    fn test_view_container_bindings_rows() {
        let mut app_container = AppContainer::new(None);
        let module = ModuleBuilder::build(
            vec![ServiceDescriptor::new(|_| Ok(MockService)).with_lifetime(Lifetime::Singleton)],
            None,
        )
        .unwrap();
        app_container.create(vec![mock_module(), module]).unwrap();

        let rows = app_container.view_container_bindings().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identifier, "MockService");
        assert_eq!(rows[0].kind, "ConstantValue");
        assert!(rows[0].has_cache);
        assert_eq!(rows[1].identifier, "Symbol(MockService)");
        assert_eq!(rows[1].scope, Lifetime::Singleton);
        assert!(!rows[1].has_cache);

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["Service Identifier"], "Symbol(MockService)");
        assert_eq!(json["Scope"], "Singleton");
        assert_eq!(json["Type"], "Instance");
        assert_eq!(json["Cache"], false);
    }

    #[test]
    fn test_empty_container_has_no_rows() {
        let mut app_container = AppContainer::new(None);
        app_container.create(Vec::new()).unwrap();
        assert!(app_container.view_container_bindings().unwrap().is_empty());
    }
}
