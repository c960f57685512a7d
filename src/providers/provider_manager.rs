//! # Provider Registry
//!
//! 장수명(long-lived) 프로바이더의 등록과 조회를 담당합니다.
//! 같은 식별자는 최대 한 번만 등록되며, 이미 등록된 식별자의 재등록은
//! 에러 없이 무시됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! let providers = ProviderManager::new(container.clone(), Arc::new(Logger));
//!
//! providers.register(&ServiceDescriptor::new(|_| Ok(Logger)), Some(Lifetime::Singleton))?;
//! let logger = providers.get::<Logger>(&ServiceIdentifier::of::<Logger>())?;
//! ```

use std::sync::Arc;

use crate::core::container::Container;
use crate::core::descriptor::ServiceDescriptor;
use crate::core::errors::{ContainerError, ContainerResult};
use crate::core::identifier::ServiceIdentifier;
use crate::core::lifetime::Lifetime;
use crate::providers::logger::LogSink;

const ORIGIN: &str = "provider-manager";

/// 프로바이더 등록/조회 파사드
#[derive(Clone)]
pub struct ProviderManager {
    container: Arc<Container>,
    logger: Arc<dyn LogSink>,
}

impl ProviderManager {
    pub fn new(container: Arc<Container>, logger: Arc<dyn LogSink>) -> Self {
        Self { container, logger }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    /// 프로바이더를 등록합니다.
    ///
    /// 이미 바인딩된 식별자이면 정보 로그만 남기고 아무것도 하지 않습니다.
    /// 라이프타임이 없으면 `RequestScoped`로 바인딩합니다.
    ///
    /// # Errors
    ///
    /// * `ContainerError::InvalidArgument` - 식별자가 비어 있는 디스크립터
    pub fn register(&self, descriptor: &ServiceDescriptor, lifetime: Option<Lifetime>) -> ContainerResult<()> {
        if self.container.is_bound(descriptor.identifier()) {
            self.logger
                .info(&format!("{} is already registered", descriptor.identifier()), ORIGIN);
            return Ok(());
        }

        self.container
            .bind(descriptor, lifetime.or(descriptor.lifetime()).unwrap_or_default())
    }

    /// 프로바이더를 조회합니다.
    ///
    /// # Errors
    ///
    /// * `ContainerError::ProviderNotRegistered` - 등록되지 않은 식별자.
    ///   이 경우 `"<name> not registered"` 에러 로그가 정확히 한 번 기록됩니다.
    pub fn get<T: Send + Sync + 'static>(&self, identifier: &ServiceIdentifier) -> ContainerResult<Arc<T>> {
        self.container.get::<T>(identifier).inspect_err(|error| {
            if let ContainerError::ProviderNotRegistered(name) = error {
                self.logger.error(&format!("{} not registered", name), ORIGIN);
            }
        })
    }
}

impl std::fmt::Debug for ProviderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderManager")
            .field("container", &self.container)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::container::ContainerOptions;
    use crate::providers::logger::testing::{Level, RecordingSink};
    use crate::providers::logger::Logger;

    #[derive(Debug)]
    struct Mailer;

    fn manager() -> (ProviderManager, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let container = Arc::new(Container::new(ContainerOptions::default()));
        (ProviderManager::new(container, sink.clone()), sink)
    }

    #[test]
    fn test_register_and_get_singleton() {
        let (providers, sink) = manager();
        providers
            .register(&ServiceDescriptor::new(|_| Ok(Logger)), Some(Lifetime::Singleton))
            .unwrap();

        let first = providers.get::<Logger>(&ServiceIdentifier::of::<Logger>()).unwrap();
        let second = providers.get::<Logger>(&ServiceIdentifier::of::<Logger>()).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_register_twice_is_noop() {
        let (providers, sink) = manager();
        let descriptor = ServiceDescriptor::new(|_| Ok(Mailer));

        providers.register(&descriptor, Some(Lifetime::Singleton)).unwrap();
        providers.register(&descriptor, Some(Lifetime::Transient)).unwrap();

        let rows = providers.container().bindings();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].scope, Lifetime::Singleton);
        assert_eq!(
            sink.records(),
            vec![(
                Level::Info,
                "Symbol(Mailer) is already registered".to_string(),
                "provider-manager".to_string()
            )]
        );
    }

    #[test]
    fn test_register_without_lifetime_is_request_scoped() {
        let (providers, _) = manager();
        providers.register(&ServiceDescriptor::new(|_| Ok(Mailer)), None).unwrap();
        assert_eq!(providers.container().bindings()[0].scope, Lifetime::RequestScoped);
    }

    #[test]
    fn test_register_blank_identifier_fails() {
        let (providers, _) = manager();
        let result = providers.register(&ServiceDescriptor::named("", |_| Ok(Mailer)), None);
        assert!(matches!(result, Err(ContainerError::InvalidArgument(_))));
    }

    #[test]
    fn test_get_unregistered_logs_once() {
        let (providers, sink) = manager();

        let result = providers.get::<Mailer>(&ServiceIdentifier::named("Mailer"));

        let error = result.unwrap_err();
        assert_eq!(error, ContainerError::ProviderNotRegistered("Mailer".to_string()));
        assert_eq!(error.to_string(), "Provider Mailer not registered");
        assert_eq!(
            sink.records(),
            vec![(Level::Error, "Mailer not registered".to_string(), "provider-manager".to_string())]
        );
    }
}
