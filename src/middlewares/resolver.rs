//! # Middleware Resolver
//!
//! 문자열 태그와 생성 인자로 미들웨어 유닛을 만들어 주는 레지스트리입니다.
//! 선택적 미들웨어의 유일한 연결 지점이며, 태그가 등록되어 있지 않으면
//! 에러 대신 `None`을 반환합니다 ("기능 비활성화"와 동일하게 취급).
//!
//! ## 등록 방식
//!
//! 1. 바이너리에 링크된 통합은 `inventory::submit!`으로 자기 자신을 등록합니다.
//! 2. 애플리케이션은 `register`로 팩토리를 직접 추가하거나 교체할 수 있습니다.
//!
//! ```rust,ignore
//! inventory::submit! {
//!     MiddlewareIntegration { tag: "compression", factory: compression_factory }
//! }
//!
//! let mut resolver = MiddlewareResolver::with_linked_integrations();
//! resolver.register("session", |args| Some(my_session_unit(args)));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::middlewares::pipeline::MiddlewareUnit;

/// 태그 → 미들웨어 유닛 팩토리
pub type MiddlewareFactory = Arc<dyn Fn(&[Value]) -> Option<MiddlewareUnit> + Send + Sync>;

/// 바이너리에 링크된 미들웨어 통합 등록 정보
///
/// `inventory`를 통해 컴파일 타임에 수집됩니다.
pub struct MiddlewareIntegration {
    /// 슬롯 태그 (대소문자 구분)
    pub tag: &'static str,
    /// 생성 인자로 유닛을 만드는 함수
    pub factory: fn(&[Value]) -> Option<MiddlewareUnit>,
}

inventory::collect!(MiddlewareIntegration);

/// 링크된 통합의 태그 → 등록정보 캐시
static LINKED_INTEGRATIONS: Lazy<HashMap<&'static str, &'static MiddlewareIntegration>> = Lazy::new(|| {
    let mut cache = HashMap::new();
    for integration in inventory::iter::<MiddlewareIntegration>() {
        cache.insert(integration.tag, integration);
    }
    cache
});

/// 미들웨어 리졸버
#[derive(Clone, Default)]
pub struct MiddlewareResolver {
    factories: HashMap<String, MiddlewareFactory>,
}

impl MiddlewareResolver {
    /// 비어 있는 리졸버 (모든 태그가 사용 불가)
    pub fn new() -> Self {
        Self::default()
    }

    /// 바이너리에 링크된 모든 통합으로 채워진 리졸버
    pub fn with_linked_integrations() -> Self {
        let mut resolver = Self::new();
        for (tag, integration) in LINKED_INTEGRATIONS.iter() {
            let factory = integration.factory;
            resolver
                .factories
                .insert(tag.to_string(), Arc::new(move |args: &[Value]| factory(args)));
        }
        resolver
    }

    /// 태그에 팩토리를 등록합니다. 같은 태그가 있으면 교체합니다.
    pub fn register<F>(&mut self, tag: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Option<MiddlewareUnit> + Send + Sync + 'static,
    {
        self.factories.insert(tag.into(), Arc::new(factory));
        self
    }

    /// 태그와 생성 인자로 유닛을 생성합니다.
    ///
    /// 빈 태그, 등록되지 않은 태그, 팩토리가 `None`을 반환한 경우 모두 `None`입니다.
    /// 팩토리 내부의 패닉은 그대로 전파됩니다.
    pub fn resolve(&self, tag: &str, args: &[Value]) -> Option<MiddlewareUnit> {
        if tag.is_empty() {
            return None;
        }

        let factory = self.factories.get(tag)?;
        let unit = factory(args);
        if unit.is_none() {
            log::debug!(target: "configure-service", "middleware [{}] is not available", tag);
        }
        unit
    }

    pub fn is_available(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// 등록된 태그 목록 (정렬됨)
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for MiddlewareResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareResolver").field("tags", &self.tags()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::pipeline::Next;
    use serde_json::json;

    fn echo_factory(args: &[Value]) -> Option<MiddlewareUnit> {
        let name = args.first()?.as_str()?.to_string();
        Some(MiddlewareUnit::new(name, |req, next: Next| next.call(req)))
    }

    #[test]
    fn test_unknown_and_empty_tags_resolve_to_none() {
        let resolver = MiddlewareResolver::with_linked_integrations();
        assert!(resolver.resolve("", &[]).is_none());
        assert!(resolver.resolve("definitelyNotRegistered", &[]).is_none());
    }

    #[test]
    fn test_registered_factory_receives_args() {
        let mut resolver = MiddlewareResolver::new();
        resolver.register("echo", echo_factory);

        let unit = resolver.resolve("echo", &[json!("custom")]).unwrap();
        assert_eq!(unit.name(), "custom");
        assert!(resolver.resolve("echo", &[]).is_none());
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let mut resolver = MiddlewareResolver::new();
        resolver.register("bodyParser", echo_factory);

        assert!(resolver.is_available("bodyParser"));
        assert!(resolver.resolve("BodyParser", &[json!("x")]).is_none());
    }

    #[test]
    fn test_register_replaces_existing_tag() {
        let mut resolver = MiddlewareResolver::new();
        resolver.register("echo", |_| None);
        resolver.register("echo", echo_factory);

        assert_eq!(resolver.tags(), vec!["echo"]);
        assert!(resolver.resolve("echo", &[json!("second")]).is_some());
    }

    #[test]
    fn test_linked_integrations_are_collected() {
        let resolver = MiddlewareResolver::with_linked_integrations();
        for tag in ["bodyParser", "cors", "cookieParser", "rateLimiter", "serveFavicon", "urlencodedParser"] {
            assert!(resolver.is_available(tag), "{} should be linked", tag);
        }
        assert!(!resolver.is_available("compression"));
    }

    #[test]
    #[should_panic(expected = "broken factory")]
    fn test_factory_panic_propagates() {
        let mut resolver = MiddlewareResolver::new();
        resolver.register("broken", |_| panic!("broken factory"));
        resolver.resolve("broken", &[]);
    }
}
