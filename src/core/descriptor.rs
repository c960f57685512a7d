//! 서비스 디스크립터
//!
//! 리플렉션 메타데이터 대신, 서비스 타입과 생성자, 라이프타임을 명시적으로
//! 묶어 Module Builder에 전달하는 등록 단위입니다.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::core::container::Resolver;
use crate::core::errors::ContainerResult;
use crate::core::identifier::ServiceIdentifier;
use crate::core::lifetime::Lifetime;

/// 컨테이너에 보관되는 타입 소거된 인스턴스
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 타입 소거된 생성자 함수
pub type Constructor = Arc<dyn Fn(&Resolver<'_>) -> ContainerResult<Instance> + Send + Sync>;

/// 컨테이너가 직접 생성할 수 있는 타입
///
/// 명시적으로 바인딩되지 않았더라도 `auto_bind_injectable` 옵션이 켜져 있으면
/// [`crate::core::Container::resolve`]로 해석할 수 있습니다.
///
/// # Examples
///
/// ```rust,ignore
/// struct UserService {
///     repo: Arc<UserRepository>,
/// }
///
/// impl Injectable for UserService {
///     fn construct(resolver: &Resolver<'_>) -> ContainerResult<Self> {
///         Ok(Self { repo: resolver.resolve::<UserRepository>()? })
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    fn construct(resolver: &Resolver<'_>) -> ContainerResult<Self>;
}

/// 서비스 등록 정보
///
/// 식별자, 생성자, 그리고 선택적인 라이프타임 태그로 구성됩니다.
/// 라이프타임은 `with_lifetime`으로 지정하며, 지정하지 않으면
/// Module Builder의 기본값을 따릅니다.
#[derive(Clone)]
pub struct ServiceDescriptor {
    identifier: ServiceIdentifier,
    constructor: Constructor,
    lifetime: Option<Lifetime>,
}

impl ServiceDescriptor {
    /// 타입 `T`의 심볼로 식별되는 디스크립터를 생성합니다.
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self::with_identifier(ServiceIdentifier::of::<T>(), factory)
    }

    /// 문자열 이름으로 식별되는 디스크립터를 생성합니다.
    pub fn named<T, F>(name: impl Into<std::borrow::Cow<'static, str>>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self::with_identifier(ServiceIdentifier::named(name), factory)
    }

    /// [`Injectable`] 구현을 생성자로 사용하는 디스크립터
    pub fn injectable<T: Injectable>() -> Self {
        Self::new(T::construct)
    }

    /// 임의의 식별자와 생성자로 디스크립터를 생성합니다.
    pub fn with_identifier<T, F>(identifier: ServiceIdentifier, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
    {
        Self {
            identifier,
            constructor: erase(factory),
            lifetime: None,
        }
    }

    /// 라이프타임 태그를 지정합니다.
    pub fn with_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn identifier(&self) -> &ServiceIdentifier {
        &self.identifier
    }

    pub fn lifetime(&self) -> Option<Lifetime> {
        self.lifetime
    }

    pub(crate) fn constructor(&self) -> Constructor {
        self.constructor.clone()
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("identifier", &self.identifier)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

/// 타입이 있는 팩토리를 타입 소거된 생성자로 변환합니다.
pub(crate) fn erase<T, F>(factory: F) -> Constructor
where
    T: Send + Sync + 'static,
    F: Fn(&Resolver<'_>) -> ContainerResult<T> + Send + Sync + 'static,
{
    Arc::new(move |resolver| {
        let value = factory(resolver)?;
        Ok(Arc::new(value) as Instance)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Clock;

    #[test]
    fn test_descriptor_defaults_to_no_lifetime() {
        let descriptor = ServiceDescriptor::new(|_| Ok(Clock));
        assert_eq!(descriptor.identifier(), &ServiceIdentifier::of::<Clock>());
        assert_eq!(descriptor.lifetime(), None);
    }

    #[test]
    fn test_with_lifetime_sets_tag() {
        let descriptor = ServiceDescriptor::new(|_| Ok(Clock)).with_lifetime(Lifetime::Singleton);
        assert_eq!(descriptor.lifetime(), Some(Lifetime::Singleton));
    }

    #[test]
    fn test_named_descriptor() {
        let descriptor = ServiceDescriptor::named("clock", |_| Ok(Clock));
        assert_eq!(descriptor.identifier().name(), "clock");
    }
}
