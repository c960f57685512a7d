//! 파이프라인 실행 미들웨어
//!
//! [`MiddlewareService`]로 조립한 파이프라인을 ActixWeb 요청 처리에 연결합니다.
//! 요청마다 컨테이너의 요청 스코프를 만들어 request extension에 저장하고,
//! 파이프라인 유닛을 삽입 순서대로 실행한 뒤 라우트 핸들러를 호출합니다.
//!
//! # 사용 방법
//!
//! ```rust,ignore
//! let pipeline = PipelineMiddleware::new(container.clone(), &middleware_service);
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .wrap(pipeline.clone())
//!         .route("/health", web::get().to(health))
//! })
//! ```
//!
//! 핸들러에서는 [`request_scope`]로 현재 요청의 스코프를 가져옵니다.
//!
//! ```rust,ignore
//! async fn health(req: HttpRequest) -> AppResult<HttpResponse> {
//!     let scope = request_scope(&req).ok_or_else(|| AppError::InternalError("no scope".into()))?;
//!     let audit = scope.resolve::<AuditTrail>()?;
//!     Ok(HttpResponse::Ok().json(audit.summary()))
//! }
//! ```

use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage, HttpRequest,
};

use crate::core::{Container, RequestScope};
use crate::errors::handler::ErrorHandler;
use crate::middlewares::pipeline::MiddlewareEntry;
use crate::middlewares::pipeline_inner::PipelineService;
use crate::middlewares::service::MiddlewareService;

/// 조립된 파이프라인의 스냅샷을 실행하는 ActixWeb 미들웨어
#[derive(Clone)]
pub struct PipelineMiddleware {
    container: Arc<Container>,
    entries: Arc<[MiddlewareEntry]>,
    error_handler: ErrorHandler,
}

impl PipelineMiddleware {
    /// 현재 파이프라인과 에러 핸들러를 스냅샷으로 가져옵니다.
    ///
    /// 이후 `MiddlewareService`에 추가한 유닛은 반영되지 않습니다.
    pub fn new(container: Arc<Container>, middleware: &MiddlewareService) -> Self {
        Self {
            container,
            entries: Arc::from(middleware.get_middleware_pipeline().to_vec()),
            error_handler: middleware.get_error_handler(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// ActixWeb Transform trait 구현
impl<S, B> Transform<S, ServiceRequest> for PipelineMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = PipelineService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(PipelineService {
            service: Rc::new(service),
            container: self.container.clone(),
            entries: self.entries.clone(),
            error_handler: self.error_handler.clone(),
        }))
    }
}

/// 현재 요청의 컨테이너 스코프
///
/// `PipelineMiddleware`로 감싸지 않은 라우트에서는 `None`입니다.
pub fn request_scope(req: &HttpRequest) -> Option<Arc<RequestScope>> {
    req.extensions().get::<Arc<RequestScope>>().cloned()
}
