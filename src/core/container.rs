//! # Container - 바인딩 테이블과 인스턴스 해석
//!
//! 컨테이너는 모듈에서 로드된 바인딩을 소유하고, 라이프타임 규칙에 따라
//! 인스턴스를 생성/캐싱합니다.
//!
//! ## 라이프타임별 해석 규칙
//!
//! | Lifetime | 캐시 위치 | 동시성 |
//! |----------|-----------|--------|
//! | `Singleton` | 바인딩의 `OnceCell` | 첫 호출자만 생성, 나머지는 대기 후 같은 인스턴스 |
//! | `Transient` | 없음 | 매번 새 인스턴스 |
//! | `RequestScoped` | [`RequestScope`] | 요청 간 공유 없음 |
//!
//! ## 동작 원리
//!
//! ```text
//! Container::get::<T>(id)
//!    ├─ 바인딩 조회 (RwLock 읽기, Arc 복제 후 즉시 해제)
//!    ├─ 순환 참조 검사 (현재 해석 스택)
//!    ├─ 라이프타임별 캐시 확인 → 생성자 호출
//!    └─ Arc<dyn Any> → Arc<T> 다운캐스트
//! ```
//!
//! `Container::get`을 요청 스코프 밖에서 호출하면 해당 호출 하나가
//! 하나의 요청 경계가 됩니다. HTTP 요청 단위의 공유가 필요하면
//! [`Container::create_request_scope`]로 스코프를 열어 사용합니다.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::descriptor::{Injectable, Instance, ServiceDescriptor};
use crate::core::errors::{ContainerError, ContainerResult};
use crate::core::identifier::ServiceIdentifier;
use crate::core::lifetime::Lifetime;
use crate::core::module::{BindingTarget, ContainerModule};

/// 컨테이너 생성 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContainerOptions {
    /// 스코프가 지정되지 않은 바인딩과 자동 바인딩에 적용되는 라이프타임
    pub default_scope: Lifetime,
    /// 명시적으로 바인딩되지 않은 [`Injectable`] 타입의 해석 허용 여부
    pub auto_bind_injectable: bool,
    /// 베이스 클래스 검사 생략 여부 (미지정 시 `None`)
    pub skip_base_class_checks: Option<bool>,
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self {
            default_scope: Lifetime::RequestScoped,
            auto_bind_injectable: true,
            skip_base_class_checks: None,
        }
    }
}

/// 컨테이너가 소유하는 바인딩 레코드
struct Binding {
    identifier: ServiceIdentifier,
    target: BindingTarget,
    lifetime: Lifetime,
    module_id: Option<Uuid>,
    cache: OnceCell<Instance>,
}

impl Binding {
    fn new(identifier: ServiceIdentifier, target: BindingTarget, lifetime: Lifetime, module_id: Option<Uuid>) -> Self {
        let cache = match &target {
            BindingTarget::ConstantValue(value) => OnceCell::with_value(value.clone()),
            _ => OnceCell::new(),
        };

        Self {
            identifier,
            target,
            lifetime,
            module_id,
            cache,
        }
    }
}

/// 등록 순서를 보존하는 바인딩 테이블
#[derive(Default)]
struct BindingTable {
    order: Vec<Arc<Binding>>,
    index: HashMap<ServiceIdentifier, usize>,
}

impl BindingTable {
    fn get(&self, identifier: &ServiceIdentifier) -> Option<Arc<Binding>> {
        self.index.get(identifier).map(|&position| self.order[position].clone())
    }

    fn contains(&self, identifier: &ServiceIdentifier) -> bool {
        self.index.contains_key(identifier)
    }

    fn insert(&mut self, binding: Binding) {
        self.index.insert(binding.identifier.clone(), self.order.len());
        self.order.push(Arc::new(binding));
    }
}

/// 바인딩 진단 정보 (`viewContainerBindings`의 한 행)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    #[serde(rename = "Service Identifier")]
    pub identifier: String,
    #[serde(rename = "Scope")]
    pub scope: Lifetime,
    #[serde(rename = "Type")]
    pub kind: &'static str,
    #[serde(rename = "Cache")]
    pub has_cache: bool,
    #[serde(skip)]
    pub module_id: Option<Uuid>,
}

/// 의존성 주입 컨테이너
///
/// `Send + Sync`이므로 `Arc<Container>`로 여러 워커 스레드에서 공유할 수 있습니다.
/// 전역 인스턴스는 없으며, 필요한 컴포넌트에 명시적으로 전달합니다.
pub struct Container {
    options: ContainerOptions,
    bindings: RwLock<BindingTable>,
}

impl Container {
    pub fn new(options: ContainerOptions) -> Self {
        Self {
            options,
            bindings: RwLock::new(BindingTable::default()),
        }
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.options
    }

    /// 모듈들을 원자적으로 로드합니다.
    ///
    /// 모든 바인딩을 먼저 검증한 뒤 한 번에 반영하므로, 하나라도 실패하면
    /// 어떤 바인딩도 추가되지 않습니다.
    ///
    /// # Errors
    ///
    /// * `ContainerError::InvalidModule` - 대상이 없는 바인딩, 또는 이미 바인딩된 식별자
    pub fn load(&self, modules: Vec<ContainerModule>) -> ContainerResult<()> {
        let mut table = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        let mut staged = Vec::new();
        let mut seen = HashSet::new();

        for module in modules {
            let module_id = module.id();
            for pending in module.bindings {
                let target = pending.target.ok_or_else(|| {
                    ContainerError::InvalidModule(format!(
                        "binding for {} in module {} has no target",
                        pending.identifier, module_id
                    ))
                })?;

                if table.contains(&pending.identifier) || !seen.insert(pending.identifier.clone()) {
                    return Err(ContainerError::InvalidModule(format!(
                        "{} is already bound",
                        pending.identifier
                    )));
                }

                let lifetime = pending.lifetime.unwrap_or(self.options.default_scope);
                staged.push(Binding::new(pending.identifier, target, lifetime, Some(module_id)));
            }
        }

        log::debug!(target: "app-container", "loading {} bindings", staged.len());
        for binding in staged {
            table.insert(binding);
        }

        Ok(())
    }

    /// 디스크립터를 지정한 라이프타임으로 바인딩합니다.
    ///
    /// # Errors
    ///
    /// * `ContainerError::InvalidArgument` - 식별자가 비어 있거나 이미 바인딩된 경우
    pub fn bind(&self, descriptor: &ServiceDescriptor, lifetime: Lifetime) -> ContainerResult<()> {
        if descriptor.identifier().is_blank() {
            return Err(ContainerError::InvalidArgument(
                "service descriptor has no identifier".to_string(),
            ));
        }

        let mut table = self.bindings.write().unwrap_or_else(PoisonError::into_inner);
        if table.contains(descriptor.identifier()) {
            return Err(ContainerError::InvalidArgument(format!(
                "{} is already bound",
                descriptor.identifier()
            )));
        }

        table.insert(Binding::new(
            descriptor.identifier().clone(),
            BindingTarget::Instance(descriptor.constructor()),
            lifetime,
            None,
        ));
        Ok(())
    }

    pub fn is_bound(&self, identifier: &ServiceIdentifier) -> bool {
        self.read_table().contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.read_table().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 식별자로 인스턴스를 해석합니다.
    ///
    /// # Errors
    ///
    /// * `ContainerError::ProviderNotRegistered` - 바인딩이 없는 경우
    /// * `ContainerError::TypeMismatch` - 바인딩된 값의 타입이 `T`가 아닌 경우
    /// * `ContainerError::CircularDependency` - 해석 중 순환이 감지된 경우
    pub fn get<T: Send + Sync + 'static>(&self, identifier: &ServiceIdentifier) -> ContainerResult<Arc<T>> {
        let requests = RequestInstances::default();
        Resolver::new(self, &requests).get(identifier)
    }

    /// 타입 `T`의 심볼로 해석합니다. 바인딩이 없으면 옵션에 따라 자동 바인딩합니다.
    pub fn resolve<T: Injectable>(&self) -> ContainerResult<Arc<T>> {
        let requests = RequestInstances::default();
        Resolver::new(self, &requests).resolve()
    }

    /// 하나의 인바운드 요청에 대응하는 스코프를 엽니다.
    pub fn create_request_scope(self: &Arc<Self>) -> RequestScope {
        RequestScope {
            id: Uuid::new_v4(),
            container: self.clone(),
            instances: RequestInstances::default(),
        }
    }

    /// 등록 순서대로 바인딩 진단 정보를 반환합니다.
    pub fn bindings(&self) -> Vec<BindingInfo> {
        self.read_table()
            .order
            .iter()
            .map(|binding| BindingInfo {
                identifier: binding.identifier.to_string(),
                scope: binding.lifetime,
                kind: binding.target.kind(),
                has_cache: binding.cache.get().is_some(),
                module_id: binding.module_id,
            })
            .collect()
    }

    fn read_table(&self) -> std::sync::RwLockReadGuard<'_, BindingTable> {
        self.bindings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup(&self, identifier: &ServiceIdentifier) -> Option<Arc<Binding>> {
        self.read_table().get(identifier)
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("options", &self.options)
            .field("bindings", &self.len())
            .finish()
    }
}

/// 요청 스코프 인스턴스 저장소
#[derive(Default)]
struct RequestInstances {
    instances: Mutex<HashMap<ServiceIdentifier, Instance>>,
}

impl RequestInstances {
    fn get(&self, identifier: &ServiceIdentifier) -> Option<Instance> {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    fn store(&self, identifier: ServiceIdentifier, instance: Instance) -> Instance {
        self.instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(identifier)
            .or_insert(instance)
            .clone()
    }

    fn len(&self) -> usize {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// 하나의 인바운드 요청 동안 유지되는 스코프
///
/// 요청 스코프 바인딩은 이 스코프 안에서 한 번만 생성되며,
/// 스코프가 drop될 때 함께 해제됩니다.
pub struct RequestScope {
    id: Uuid,
    container: Arc<Container>,
    instances: RequestInstances,
}

impl RequestScope {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn get<T: Send + Sync + 'static>(&self, identifier: &ServiceIdentifier) -> ContainerResult<Arc<T>> {
        Resolver::new(&self.container, &self.instances).get(identifier)
    }

    pub fn resolve<T: Injectable>(&self) -> ContainerResult<Arc<T>> {
        Resolver::new(&self.container, &self.instances).resolve()
    }

    /// 이 스코프에 생성된 요청 스코프 인스턴스 수
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 생성자에 전달되는 해석 컨텍스트
///
/// 생성자 안에서 의존성을 해석할 때 사용하며, 같은 해석 트리 안의
/// 순환 참조를 추적합니다.
pub struct Resolver<'a> {
    container: &'a Container,
    requests: &'a RequestInstances,
    resolving: RefCell<Vec<ServiceIdentifier>>,
}

impl<'a> Resolver<'a> {
    fn new(container: &'a Container, requests: &'a RequestInstances) -> Self {
        Self {
            container,
            requests,
            resolving: RefCell::new(Vec::new()),
        }
    }

    pub fn container(&self) -> &Container {
        self.container
    }

    pub fn get<T: Send + Sync + 'static>(&self, identifier: &ServiceIdentifier) -> ContainerResult<Arc<T>> {
        let binding = self
            .container
            .lookup(identifier)
            .ok_or_else(|| ContainerError::ProviderNotRegistered(identifier.name().to_string()))?;

        self.instantiate(&binding)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                identifier: identifier.name().to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn resolve<T: Injectable>(&self) -> ContainerResult<Arc<T>> {
        let identifier = ServiceIdentifier::of::<T>();

        if !self.container.is_bound(&identifier) {
            if !self.container.options.auto_bind_injectable {
                return Err(ContainerError::ProviderNotRegistered(identifier.name().to_string()));
            }

            log::debug!(target: "app-container", "auto-binding {}", identifier);
            // 동시에 자동 바인딩된 경우 먼저 등록된 바인딩을 사용합니다.
            let _ = self
                .container
                .bind(&ServiceDescriptor::injectable::<T>(), self.container.options.default_scope);
        }

        self.get(&identifier)
    }

    fn instantiate(&self, binding: &Binding) -> ContainerResult<Instance> {
        if let BindingTarget::ConstantValue(value) = &binding.target {
            return Ok(value.clone());
        }

        // 싱글톤 셀 초기화에 재진입하기 전에 순환을 검사합니다.
        if self.resolving.borrow().contains(&binding.identifier) {
            log::error!(target: "app-container", "❌ Circular dependency detected for {}", binding.identifier);
            return Err(ContainerError::CircularDependency(binding.identifier.name().to_string()));
        }

        match binding.lifetime {
            Lifetime::Singleton => binding
                .cache
                .get_or_try_init(|| self.construct_detached(binding))
                .cloned(),
            Lifetime::Transient => self.construct(binding),
            Lifetime::RequestScoped => {
                if let Some(instance) = self.requests.get(&binding.identifier) {
                    return Ok(instance);
                }
                let instance = self.construct(binding)?;
                Ok(self.requests.store(binding.identifier.clone(), instance))
            }
        }
    }

    /// 비어 있는 요청 저장소로 싱글톤을 생성합니다.
    ///
    /// 싱글톤은 모든 요청이 공유하므로 현재 요청의 인스턴스를 붙잡으면 안 됩니다.
    /// 순환 추적 스택은 그대로 이어받습니다.
    fn construct_detached(&self, binding: &Binding) -> ContainerResult<Instance> {
        let requests = RequestInstances::default();
        let resolver = Resolver {
            container: self.container,
            requests: &requests,
            resolving: RefCell::new(self.resolving.borrow().clone()),
        };
        resolver.construct(binding)
    }

    fn construct(&self, binding: &Binding) -> ContainerResult<Instance> {
        let constructor = match &binding.target {
            BindingTarget::Instance(constructor) | BindingTarget::DynamicValue(constructor) => constructor,
            BindingTarget::ConstantValue(value) => return Ok(value.clone()),
        };

        self.resolving.borrow_mut().push(binding.identifier.clone());
        let result = constructor(self);
        self.resolving.borrow_mut().pop();

        result
    }
}
