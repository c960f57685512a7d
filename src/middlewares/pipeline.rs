//! 미들웨어 파이프라인 구성 요소
//!
//! 파이프라인은 [`MiddlewareEntry`]의 순서 있는 목록입니다. 각 엔트리는
//! 삽입 시각과 하나의 [`PipelineUnit`]을 가지며, 유닛은 전역 미들웨어 하나이거나
//! 특정 경로에만 적용되는 미들웨어 그룹입니다.
//!
//! ```text
//! 요청 ──► [bodyParser] ──► [cors] ──► [/api: auth, audit] ──► 핸들러
//!            Global          Global      경로 그룹 (접두사 일치 시)
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::Error;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures_util::future::LocalBoxFuture;
use serde::Serialize;

/// 미들웨어 유닛이 반환하는 future
pub type MiddlewareFuture = LocalBoxFuture<'static, Result<ServiceResponse<BoxBody>, Error>>;

type Handler = Arc<dyn Fn(ServiceRequest, Next) -> MiddlewareFuture + Send + Sync>;
pub(crate) type Terminal = Rc<dyn Fn(ServiceRequest) -> MiddlewareFuture>;

/// 구조체 형태로 작성하는 사용자 미들웨어
///
/// # Examples
///
/// ```rust,ignore
/// struct RequestTimer;
///
/// #[async_trait(?Send)]
/// impl Middleware for RequestTimer {
///     fn name(&self) -> &str {
///         "requestTimer"
///     }
///
///     async fn handle(&self, req: ServiceRequest, next: Next) -> Result<ServiceResponse<BoxBody>, Error> {
///         let started = std::time::Instant::now();
///         let res = next.call(req).await?;
///         log::info!("{} took {:?}", res.request().path(), started.elapsed());
///         Ok(res)
///     }
/// }
///
/// middleware_service.add_middleware(MiddlewareUnit::from_middleware(RequestTimer));
/// ```
#[async_trait(?Send)]
pub trait Middleware: Send + Sync + 'static {
    /// 파이프라인 진단과 중복 검사에 사용되는 이름
    fn name(&self) -> &str;

    async fn handle(&self, req: ServiceRequest, next: Next) -> Result<ServiceResponse<BoxBody>, Error>;
}

/// 이름이 있는 요청 처리 유닛
///
/// 복제해도 같은 호출 대상(callable)을 가리키며, 파이프라인의 중복 검사는
/// 이름 또는 호출 대상의 동일성으로 판단합니다.
#[derive(Clone)]
pub struct MiddlewareUnit {
    name: Cow<'static, str>,
    handler: Handler,
}

impl MiddlewareUnit {
    /// 비동기 클로저로 유닛을 생성합니다.
    pub fn new<F, Fut>(name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: Fn(ServiceRequest, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ServiceResponse<BoxBody>, Error>> + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(move |req: ServiceRequest, next: Next| -> MiddlewareFuture {
                Box::pin(handler(req, next))
            }),
        }
    }

    /// [`Middleware`] 구현으로 유닛을 생성합니다.
    pub fn from_middleware<M: Middleware>(middleware: M) -> Self {
        let name = middleware.name().to_string();
        let middleware = Arc::new(middleware);

        Self {
            name: Cow::Owned(name),
            handler: Arc::new(move |req: ServiceRequest, next: Next| -> MiddlewareFuture {
                let middleware = middleware.clone();
                Box::pin(async move { middleware.handle(req, next).await })
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 두 유닛이 같은 호출 대상을 감싸는지 확인합니다.
    pub fn same_callable(&self, other: &MiddlewareUnit) -> bool {
        Arc::ptr_eq(&self.handler, &other.handler)
    }

    pub fn call(&self, req: ServiceRequest, next: Next) -> MiddlewareFuture {
        (self.handler)(req, next)
    }
}

impl fmt::Debug for MiddlewareUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MiddlewareUnit").field(&self.name).finish()
    }
}

/// 파이프라인에 추가되는 단위
#[derive(Debug, Clone)]
pub enum PipelineUnit {
    /// 모든 요청에 적용되는 미들웨어
    Single(MiddlewareUnit),
    /// `path` 접두사와 일치하는 요청에만 적용되는 미들웨어 그룹
    Route {
        path: String,
        middlewares: Vec<MiddlewareUnit>,
    },
}

impl PipelineUnit {
    /// 경로 그룹을 생성합니다.
    pub fn route(path: impl Into<String>, middlewares: Vec<MiddlewareUnit>) -> Self {
        PipelineUnit::Route {
            path: path.into(),
            middlewares,
        }
    }

    /// 진단 테이블의 `path` 열 값
    pub fn path_label(&self) -> &str {
        match self {
            PipelineUnit::Single(_) => "Global",
            PipelineUnit::Route { path, .. } => path,
        }
    }

    /// 진단 테이블의 `middleware` 열 값 (`name` 또는 `[a,b]`)
    pub fn middleware_label(&self) -> String {
        match self {
            PipelineUnit::Single(unit) => unit.name().to_string(),
            PipelineUnit::Route { middlewares, .. } => {
                let names: Vec<&str> = middlewares.iter().map(MiddlewareUnit::name).collect();
                format!("[{}]", names.join(","))
            }
        }
    }

    /// 요청 경로에 적용되는 유닛들
    pub fn units_for(&self, request_path: &str) -> &[MiddlewareUnit] {
        match self {
            PipelineUnit::Single(unit) => std::slice::from_ref(unit),
            PipelineUnit::Route { path, middlewares } if path_matches(path, request_path) => middlewares.as_slice(),
            PipelineUnit::Route { .. } => &[],
        }
    }
}

impl From<MiddlewareUnit> for PipelineUnit {
    fn from(unit: MiddlewareUnit) -> Self {
        PipelineUnit::Single(unit)
    }
}

/// 경로 접두사 일치 여부 (세그먼트 경계 기준)
///
/// `/api`는 `/api`, `/api/users`와 일치하지만 `/apis`와는 일치하지 않습니다.
fn path_matches(prefix: &str, request_path: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }

    match request_path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// 파이프라인 엔트리
#[derive(Debug, Clone)]
pub struct MiddlewareEntry {
    timestamp: DateTime<Utc>,
    unit: PipelineUnit,
}

impl MiddlewareEntry {
    pub(crate) fn new(timestamp: DateTime<Utc>, unit: PipelineUnit) -> Self {
        Self { timestamp, unit }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn unit(&self) -> &PipelineUnit {
        &self.unit
    }

    /// 진단 테이블의 한 행으로 변환합니다.
    pub fn to_row(&self) -> PipelineRow {
        PipelineRow {
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            path: self.unit.path_label().to_string(),
            middleware: self.unit.middleware_label(),
        }
    }
}

/// `view_middleware_pipeline`의 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRow {
    pub timestamp: String,
    pub path: String,
    pub middleware: String,
}

/// 남은 체인을 실행하는 핸들
///
/// 유닛은 `next.call(req)`로 다음 유닛(마지막이면 라우트 핸들러)에 요청을 넘기거나,
/// 호출하지 않고 직접 응답을 만들어 체인을 중단할 수 있습니다.
#[derive(Clone)]
pub struct Next {
    chain: Rc<Vec<MiddlewareUnit>>,
    position: usize,
    terminal: Terminal,
}

impl Next {
    pub(crate) fn new(chain: Vec<MiddlewareUnit>, terminal: Terminal) -> Self {
        Self {
            chain: Rc::new(chain),
            position: 0,
            terminal,
        }
    }

    pub fn call(self, req: ServiceRequest) -> MiddlewareFuture {
        match self.chain.get(self.position).cloned() {
            Some(unit) => {
                let next = Next {
                    position: self.position + 1,
                    ..self
                };
                unit.call(req, next)
            }
            None => (self.terminal)(req),
        }
    }

    /// 아직 실행되지 않은 유닛 수
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.position)
    }
}
