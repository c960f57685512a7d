//! # Scope Resolver
//!
//! 라이프타임 태그를 바인딩 스코프 연산으로 매핑합니다.
//!
//! | 태그 | 스코프 연산 | 인스턴스 수 |
//! |------|-------------|-------------|
//! | `Singleton` | `in_singleton_scope()` | 컨테이너 수명 동안 1개 |
//! | `Transient` | `in_transient_scope()` | 해석할 때마다 새로 생성 |
//! | `RequestScoped` / 없음 / 알 수 없음 | `in_request_scope()` | 요청당 1개 |
//!
//! 잘못되었거나 누락된 태그는 에러 없이 `RequestScoped`로 처리되어,
//! 주석 하나가 애플리케이션 부팅 전체를 막지 않습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::module::BindingSyntax;

/// 서비스 인스턴스의 수명 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Lifetime {
    /// 컨테이너 수명 동안 하나의 인스턴스
    Singleton,
    /// 해석할 때마다 새 인스턴스
    Transient,
    /// 인바운드 요청마다 하나의 인스턴스, 요청 종료 시 해제
    #[default]
    RequestScoped,
}

impl Lifetime {
    /// 문자열 태그에서 Lifetime을 생성합니다.
    ///
    /// 대소문자를 구분하지 않으며, 알 수 없는 값은 `RequestScoped`로 처리합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// assert_eq!(Lifetime::from_tag("singleton"), Lifetime::Singleton);
    /// assert_eq!(Lifetime::from_tag("Request"), Lifetime::RequestScoped);
    /// assert_eq!(Lifetime::from_tag("bogus"), Lifetime::RequestScoped);
    /// ```
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "singleton" => Lifetime::Singleton,
            "transient" => Lifetime::Transient,
            _ => Lifetime::RequestScoped,
        }
    }

    /// 진단 테이블에 표시되는 스코프 이름
    pub fn label(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "Singleton",
            Lifetime::Transient => "Transient",
            Lifetime::RequestScoped => "Request",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<&str> for Lifetime {
    fn from(tag: &str) -> Self {
        Lifetime::from_tag(tag)
    }
}

impl From<String> for Lifetime {
    fn from(tag: String) -> Self {
        Lifetime::from_tag(&tag)
    }
}

impl From<Lifetime> for &'static str {
    fn from(lifetime: Lifetime) -> Self {
        lifetime.label()
    }
}

/// 열린 바인딩 표현식에 정확히 하나의 스코프 연산을 적용합니다.
///
/// 태그가 없으면 `RequestScoped`가 적용됩니다.
pub fn bind_to_scope(binding: BindingSyntax<'_>, lifetime: Option<Lifetime>) -> BindingSyntax<'_> {
    match lifetime.unwrap_or_default() {
        Lifetime::Singleton => binding.in_singleton_scope(),
        Lifetime::Transient => binding.in_transient_scope(),
        Lifetime::RequestScoped => binding.in_request_scope(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::ServiceIdentifier;
    use crate::core::module::ContainerModule;

    #[test]
    fn test_from_tag_is_lenient() {
        assert_eq!(Lifetime::from_tag("Singleton"), Lifetime::Singleton);
        assert_eq!(Lifetime::from_tag("TRANSIENT"), Lifetime::Transient);
        assert_eq!(Lifetime::from_tag("Request"), Lifetime::RequestScoped);
        assert_eq!(Lifetime::from_tag("UnknownBindingType"), Lifetime::RequestScoped);
        assert_eq!(Lifetime::from_tag(""), Lifetime::RequestScoped);
    }

    #[test]
    fn test_default_is_request_scoped() {
        assert_eq!(Lifetime::default(), Lifetime::RequestScoped);
    }

    #[test]
    fn test_serde_uses_labels() {
        let json = serde_json::to_string(&Lifetime::RequestScoped).unwrap();
        assert_eq!(json, "\"Request\"");

        let parsed: Lifetime = serde_json::from_str("\"singleton\"").unwrap();
        assert_eq!(parsed, Lifetime::Singleton);

        let fallback: Lifetime = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(fallback, Lifetime::RequestScoped);
    }

    #[test]
    fn test_bind_to_scope_applies_exactly_one_scope() {
        let cases = [
            (Some(Lifetime::Singleton), Lifetime::Singleton),
            (Some(Lifetime::Transient), Lifetime::Transient),
            (Some(Lifetime::RequestScoped), Lifetime::RequestScoped),
            (None, Lifetime::RequestScoped),
        ];

        for (tag, expected) in cases {
            let module = ContainerModule::new(|binder| {
                bind_to_scope(
                    binder.bind(ServiceIdentifier::named("Target")).to_constructor(|_| Ok(1u8)),
                    tag,
                );
            });
            assert_eq!(module.lifetime_of(&ServiceIdentifier::named("Target")), Some(expected));
        }
    }
}
