//! PipelineMiddleware 요청 처리의 핵심적인 기능
use std::rc::Rc;
use std::sync::Arc;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::{Error, HttpMessage};
use futures_util::future::LocalBoxFuture;

use crate::core::Container;
use crate::errors::handler::ErrorHandler;
use crate::middlewares::pipeline::{MiddlewareEntry, MiddlewareFuture, MiddlewareUnit, Next, Terminal};

/// 요청마다 스코프를 만들고 파이프라인 유닛을 실행하는 서비스
pub struct PipelineService<S> {
    pub service: Rc<S>,
    pub container: Arc<Container>,
    pub entries: Arc<[MiddlewareEntry]>,
    pub error_handler: ErrorHandler,
}

impl<S, B> Service<ServiceRequest> for PipelineService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let scope = Arc::new(self.container.create_request_scope());
        log::debug!(target: "app-container", "request scope {} opened for {}", scope.id(), req.path());
        req.extensions_mut().insert(scope);

        // 요청 경로에 적용되는 유닛만 삽입 순서대로 펼침
        let chain: Vec<MiddlewareUnit> = self
            .entries
            .iter()
            .flat_map(|entry| entry.unit().units_for(req.path()))
            .cloned()
            .collect();

        let service = self.service.clone();
        let terminal: Terminal = Rc::new(move |req: ServiceRequest| -> MiddlewareFuture {
            let service = service.clone();
            Box::pin(async move {
                let res = service.call(req).await?;
                Ok(res.map_into_boxed_body())
            })
        });

        let error_handler = self.error_handler.clone();

        Box::pin(async move {
            match Next::new(chain, terminal).call(req).await {
                Ok(res) => Ok(replace_error_response(res, &error_handler)),
                Err(error) => {
                    // 요청은 체인에 넘어갔으므로 응답을 에러에 실어 돌려줌
                    log::debug!(target: "error-handler", "pipeline error: {}", error);
                    let response = error_handler.handle(&error);
                    Err(InternalError::from_response(error.to_string(), response).into())
                }
            }
        })
    }
}

/// 핸들러가 에러로 응답한 경우 에러 핸들러의 응답으로 교체합니다.
fn replace_error_response(res: ServiceResponse<BoxBody>, error_handler: &ErrorHandler) -> ServiceResponse<BoxBody> {
    let Some(replacement) = res.response().error().map(|error| error_handler.handle(error)) else {
        return res;
    };

    let (req, _) = res.into_parts();
    ServiceResponse::new(req, replacement)
}
