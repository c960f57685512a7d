//! # Container Module & Module Builder
//!
//! 컨테이너 모듈은 컨테이너 시작 시 한 번 로드되는, 변경 불가능한 바인딩 집합입니다.
//!
//! ## 모듈 생성 방법
//!
//! ### 1. Module Builder (권장)
//! ```rust,ignore
//! let module = ModuleBuilder::build(
//!     vec![
//!         ServiceDescriptor::new(|_| Ok(Database::default())).with_lifetime(Lifetime::Singleton),
//!         ServiceDescriptor::injectable::<UserService>(),
//!     ],
//!     Some(Lifetime::RequestScoped),
//! )?;
//! ```
//!
//! ### 2. Binder 직접 사용
//! ```rust,ignore
//! let module = ContainerModule::new(|binder| {
//!     binder.bind("Config".into()).to_constant_value(config).in_singleton_scope();
//! });
//! ```
//!
//! 같은 모듈 안에서 동일한 식별자를 다시 바인딩하면 마지막 등록이 유지됩니다.
//! 모듈 간 식별자 충돌은 컨테이너 로드 시점에 검출됩니다.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::container::Resolver;
use crate::core::descriptor::{erase, Constructor, Instance, ServiceDescriptor};
use crate::core::errors::{ContainerError, ContainerResult};
use crate::core::identifier::ServiceIdentifier;
use crate::core::lifetime::{bind_to_scope, Lifetime};

/// 바인딩이 가리키는 구현
#[derive(Clone)]
pub(crate) enum BindingTarget {
    /// 디스크립터 생성자
    Instance(Constructor),
    /// 미리 만들어진 값
    ConstantValue(Instance),
    /// 클로저로 계산되는 값
    DynamicValue(Constructor),
}

impl BindingTarget {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            BindingTarget::Instance(_) => "Instance",
            BindingTarget::ConstantValue(_) => "ConstantValue",
            BindingTarget::DynamicValue(_) => "DynamicValue",
        }
    }
}

/// 아직 컨테이너에 로드되지 않은 바인딩
pub(crate) struct PendingBinding {
    pub(crate) identifier: ServiceIdentifier,
    pub(crate) target: Option<BindingTarget>,
    pub(crate) lifetime: Option<Lifetime>,
}

/// 모듈 등록 함수에 전달되는 바인딩 수집기
#[derive(Default)]
pub struct Binder {
    pending: Vec<PendingBinding>,
}

impl Binder {
    /// 식별자에 대한 열린 바인딩 표현식을 시작합니다.
    ///
    /// 이미 같은 식별자가 이 모듈에 있으면 이전 항목은 제거됩니다.
    pub fn bind(&mut self, identifier: ServiceIdentifier) -> BindingSyntax<'_> {
        self.pending.retain(|binding| binding.identifier != identifier);
        self.pending.push(PendingBinding {
            identifier,
            target: None,
            lifetime: None,
        });
        let index = self.pending.len() - 1;
        BindingSyntax {
            binding: &mut self.pending[index],
        }
    }
}

/// 열린 바인딩 표현식 (fluent syntax)
pub struct BindingSyntax<'a> {
    binding: &'a mut PendingBinding,
}

impl<'a> BindingSyntax<'a> {
    /// 디스크립터의 생성자에 바인딩합니다.
    pub fn to(self, descriptor: &ServiceDescriptor) -> Self {
        self.binding.target = Some(BindingTarget::Instance(descriptor.constructor()));
        self
    }

    /// 생성자 클로저에 바인딩합니다.
    pub fn to_constructor<T, F>(self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.binding.target = Some(BindingTarget::Instance(erase(factory)));
        self
    }

    /// 상수 값에 바인딩합니다. 상수는 항상 싱글톤입니다.
    pub fn to_constant_value<T: Send + Sync + 'static>(self, value: T) -> Self {
        self.binding.target = Some(BindingTarget::ConstantValue(Arc::new(value)));
        self.binding.lifetime = Some(Lifetime::Singleton);
        self
    }

    /// 해석할 때마다 계산되는 동적 값에 바인딩합니다.
    pub fn to_dynamic_value<T, F>(self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        self.binding.target = Some(BindingTarget::DynamicValue(erase(factory)));
        self
    }

    pub fn in_singleton_scope(self) -> Self {
        self.set_scope(Lifetime::Singleton)
    }

    pub fn in_transient_scope(self) -> Self {
        self.set_scope(Lifetime::Transient)
    }

    pub fn in_request_scope(self) -> Self {
        self.set_scope(Lifetime::RequestScoped)
    }

    fn set_scope(self, lifetime: Lifetime) -> Self {
        if !matches!(self.binding.target, Some(BindingTarget::ConstantValue(_))) {
            self.binding.lifetime = Some(lifetime);
        }
        self
    }
}

/// 컨테이너에 설치 가능한 바인딩 묶음
///
/// 생성 이후에는 변경할 수 없으며, 컨테이너 로드 시 소유권이 이동하여
/// 정확히 한 번만 소비됩니다.
pub struct ContainerModule {
    id: Uuid,
    pub(crate) bindings: Vec<PendingBinding>,
}

impl ContainerModule {
    /// 등록 함수로 모듈을 생성합니다.
    pub fn new<F>(registry: F) -> Self
    where
        F: FnOnce(&mut Binder),
    {
        let mut binder = Binder::default();
        registry(&mut binder);

        Self {
            id: Uuid::new_v4(),
            bindings: binder.pending,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 등록 순서대로 식별자를 반환합니다.
    pub fn identifiers(&self) -> impl Iterator<Item = &ServiceIdentifier> {
        self.bindings.iter().map(|binding| &binding.identifier)
    }

    /// 식별자에 지정된 라이프타임 (지정되지 않았으면 `None`)
    pub fn lifetime_of(&self, identifier: &ServiceIdentifier) -> Option<Lifetime> {
        self.bindings
            .iter()
            .find(|binding| &binding.identifier == identifier)
            .and_then(|binding| binding.lifetime)
    }
}

impl std::fmt::Debug for ContainerModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerModule")
            .field("id", &self.id)
            .field("bindings", &self.identifiers().collect::<Vec<_>>())
            .finish()
    }
}

/// 서비스 디스크립터 목록을 컨테이너 모듈로 변환합니다.
pub struct ModuleBuilder;

impl ModuleBuilder {
    /// 디스크립터마다 라이프타임을 결정하여 바인딩을 생성합니다.
    ///
    /// 라이프타임 결정 순서: 디스크립터 태그 → `default_lifetime` → `RequestScoped`
    ///
    /// # Errors
    ///
    /// * `ContainerError::InvalidArgument` - 식별자가 비어 있는 디스크립터가 포함된 경우
    pub fn build<I>(descriptors: I, default_lifetime: Option<Lifetime>) -> ContainerResult<ContainerModule>
    where
        I: IntoIterator<Item = ServiceDescriptor>,
    {
        let descriptors: Vec<ServiceDescriptor> = descriptors.into_iter().collect();

        if let Some(position) = descriptors.iter().position(|d| d.identifier().is_blank()) {
            return Err(ContainerError::InvalidArgument(format!(
                "service descriptor at position {} has no identifier",
                position
            )));
        }

        Ok(ContainerModule::new(|binder| {
            for descriptor in &descriptors {
                let lifetime = descriptor.lifetime().or(default_lifetime);
                bind_to_scope(binder.bind(descriptor.identifier().clone()).to(descriptor), lifetime);
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Alpha;
    struct Beta;

    #[test]
    fn test_empty_descriptor_list_builds_empty_module() {
        let module = ModuleBuilder::build(Vec::new(), None).unwrap();
        assert!(module.is_empty());
    }

    #[test]
    fn test_lifetime_precedence() {
        let module = ModuleBuilder::build(
            vec![
                ServiceDescriptor::new(|_| Ok(Alpha)).with_lifetime(Lifetime::Singleton),
                ServiceDescriptor::new(|_| Ok(Beta)),
            ],
            Some(Lifetime::Transient),
        )
        .unwrap();

        assert_eq!(module.lifetime_of(&ServiceIdentifier::of::<Alpha>()), Some(Lifetime::Singleton));
        assert_eq!(module.lifetime_of(&ServiceIdentifier::of::<Beta>()), Some(Lifetime::Transient));
    }

    #[test]
    fn test_missing_lifetime_defaults_to_request_scope() {
        let module = ModuleBuilder::build(vec![ServiceDescriptor::new(|_| Ok(Alpha))], None).unwrap();
        assert_eq!(
            module.lifetime_of(&ServiceIdentifier::of::<Alpha>()),
            Some(Lifetime::RequestScoped)
        );
    }

    #[test]
    fn test_blank_identifier_is_invalid_argument() {
        let result = ModuleBuilder::build(
            vec![
                ServiceDescriptor::new(|_| Ok(Alpha)),
                ServiceDescriptor::named("", |_| Ok(Beta)),
            ],
            None,
        );

        assert_eq!(
            result.unwrap_err(),
            ContainerError::InvalidArgument("service descriptor at position 1 has no identifier".to_string())
        );
    }

    #[test]
    fn test_duplicate_within_one_build_keeps_last() {
        let module = ModuleBuilder::build(
            vec![
                ServiceDescriptor::new(|_| Ok(Alpha)).with_lifetime(Lifetime::Singleton),
                ServiceDescriptor::new(|_| Ok(Beta)),
                ServiceDescriptor::new(|_| Ok(Alpha)).with_lifetime(Lifetime::Transient),
            ],
            None,
        )
        .unwrap();

        assert_eq!(module.len(), 2);
        assert_eq!(module.lifetime_of(&ServiceIdentifier::of::<Alpha>()), Some(Lifetime::Transient));
    }

    #[test]
    fn test_constant_value_ignores_scope_calls() {
        let module = ContainerModule::new(|binder| {
            binder
                .bind(ServiceIdentifier::named("port"))
                .to_constant_value(8080u16)
                .in_transient_scope();
        });

        assert_eq!(
            module.lifetime_of(&ServiceIdentifier::named("port")),
            Some(Lifetime::Singleton)
        );
    }

    #[test]
    fn test_modules_have_distinct_ids() {
        let first = ContainerModule::new(|_| {});
        let second = ContainerModule::new(|_| {});
        assert_ne!(first.id(), second.id());
    }
}
