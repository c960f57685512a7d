//! 서비스 식별자
//!
//! 컨테이너 안에서 바인딩 가능한 기능(capability)을 가리키는 고유 토큰입니다.
//! 타입 기반 심볼(`ServiceIdentifier::of::<T>()`)과 문자열 이름 두 가지 형태를 지원합니다.

use std::any::{type_name, TypeId};
use std::borrow::Cow;
use std::fmt;

/// 바인딩을 식별하는 토큰
///
/// 하나의 컨테이너 인스턴스 안에서 식별자는 유일해야 하며,
/// 레지스트리는 기존 바인딩을 조용히 덮어쓰지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServiceIdentifier {
    /// 타입에서 파생된 심볼
    Type { id: TypeId, name: &'static str },
    /// 문자열 이름
    Named(Cow<'static, str>),
}

impl ServiceIdentifier {
    /// 타입 `T`에 대한 심볼 식별자를 생성합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let id = ServiceIdentifier::of::<UserService>();
    /// assert_eq!(id.name(), "UserService");
    /// ```
    pub fn of<T: 'static>() -> Self {
        ServiceIdentifier::Type {
            id: TypeId::of::<T>(),
            name: extract_clean_type_name(type_name::<T>()),
        }
    }

    /// 문자열 이름 식별자를 생성합니다.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        ServiceIdentifier::Named(name.into())
    }

    /// 사람이 읽을 수 있는 식별자 이름
    pub fn name(&self) -> &str {
        match self {
            ServiceIdentifier::Type { name, .. } => name,
            ServiceIdentifier::Named(name) => name,
        }
    }

    /// 이름이 비어 있는 식별자인지 확인합니다.
    pub fn is_blank(&self) -> bool {
        self.name().trim().is_empty()
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceIdentifier::Type { name, .. } => write!(f, "Symbol({})", name),
            ServiceIdentifier::Named(name) => f.write_str(name),
        }
    }
}

impl From<&'static str> for ServiceIdentifier {
    fn from(name: &'static str) -> Self {
        ServiceIdentifier::named(name)
    }
}

impl From<String> for ServiceIdentifier {
    fn from(name: String) -> Self {
        ServiceIdentifier::named(name)
    }
}

/// 전체 모듈 경로에서 타입 이름만 추출합니다.
///
/// `std::any::type_name`은 `app::services::UserService` 처럼 경로를 포함하므로
/// 제네릭 인자 이전 구간의 마지막 세그먼트부터 잘라냅니다.
fn extract_clean_type_name(full: &'static str) -> &'static str {
    let head_end = full.find('<').unwrap_or(full.len());
    match full[..head_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}
