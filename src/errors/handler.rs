//! # Error Handler Slot
//!
//! 파이프라인에서 복구되지 않은 에러를 HTTP 응답으로 변환하는 핸들러입니다.
//! 애플리케이션은 하나의 핸들러만 가질 수 있으며, 설정하지 않으면
//! [`default_error_handler`]가 사용됩니다.
//!
//! ## 응답 규칙 (기본 핸들러)
//!
//! | 에러 | 상태 코드 | 본문 |
//! |------|-----------|------|
//! | `AppError` | 에러의 상태 코드 | `{code, error: <message>}` |
//! | `ContainerError` | 500 | `{code: 500, error: "An unexpected error occurred."}` |
//! | 그 외 | 500 | `{code: 500, error: "An unexpected error occurred."}` |

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use actix_web::{HttpResponse, ResponseError};

use crate::core::errors::ContainerError;
use crate::errors::errors::AppError;

/// 처리되지 않은 에러에 대한 기본 응답 메시지
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// 사용자 정의 에러 핸들러 함수
///
/// 두 번째 인자는 스택 트레이스(에러 원인 체인) 출력 여부입니다.
pub type ErrorHandlerFn = Arc<dyn Fn(&actix_web::Error, bool) -> HttpResponse + Send + Sync>;

/// `set_error_handler`에 전달하는 옵션
#[derive(Clone, Default)]
pub struct ErrorHandlerOptions {
    /// 사용자 정의 핸들러 (없으면 기본 핸들러)
    pub error_handler: Option<ErrorHandlerFn>,
    /// 에러 원인 체인 로그 출력 여부
    pub show_stack_trace: bool,
}

impl fmt::Debug for ErrorHandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlerOptions")
            .field("custom", &self.error_handler.is_some())
            .field("show_stack_trace", &self.show_stack_trace)
            .finish()
    }
}

/// 설정된 에러 핸들러
#[derive(Clone)]
pub struct ErrorHandler {
    handler: Option<ErrorHandlerFn>,
    show_stack_trace: bool,
}

impl ErrorHandler {
    /// 옵션으로 핸들러를 구성합니다. `None`이면 기본 핸들러입니다.
    pub fn from_options(options: Option<ErrorHandlerOptions>) -> Self {
        let options = options.unwrap_or_default();
        Self {
            handler: options.error_handler,
            show_stack_trace: options.show_stack_trace,
        }
    }

    pub fn is_default(&self) -> bool {
        self.handler.is_none()
    }

    pub fn show_stack_trace(&self) -> bool {
        self.show_stack_trace
    }

    /// 에러를 응답으로 변환합니다.
    pub fn handle(&self, error: &actix_web::Error) -> HttpResponse {
        match &self.handler {
            Some(handler) => handler(error, self.show_stack_trace),
            None => default_error_handler(error, self.show_stack_trace),
        }
    }
}

impl Default for ErrorHandler {
    fn default() -> Self {
        Self::from_options(None)
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("custom", &self.handler.is_some())
            .field("show_stack_trace", &self.show_stack_trace)
            .finish()
    }
}

/// 기본 에러 핸들러
///
/// `AppError`는 자신의 상태 코드와 메시지로, 그 외의 에러는 내부 정보를
/// 노출하지 않는 500 응답으로 변환합니다.
///
/// # Arguments
///
/// * `error` - 파이프라인 또는 핸들러에서 전파된 에러
/// * `show_stack_trace` - `true`이면 에러 원인 체인을 로그로 출력
pub fn default_error_handler(error: &actix_web::Error, show_stack_trace: bool) -> HttpResponse {
    if show_stack_trace {
        let trace = match error.as_error::<AppError>() {
            Some(app_error) => beautify_error_chain(app_error),
            None => beautify_error_chain(error),
        };
        if let Some(trace) = trace {
            log::error!(target: "error-handler", "{}", trace);
        }
    }

    if let Some(app_error) = error.as_error::<AppError>() {
        return app_error.error_response();
    }

    if let Some(container_error) = error.as_error::<ContainerError>() {
        log::error!(target: "error-handler", "{}", container_error);
        return container_error.error_response();
    }

    log::error!(target: "error-handler", "Unhandled error: {}", error);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "code": 500,
        "error": UNEXPECTED_ERROR_MESSAGE
    }))
}

/// 에러와 원인(source) 체인을 읽기 좋은 형태로 변환합니다.
///
/// 메시지가 비어 있으면 `None`을 반환합니다.
///
/// Output:
/// ```text
/// Error: Failed to construct Symbol(Mailer): connection refused
///
/// Caused by:
///    ├─ connection refused
///    ├─ os error 111
/// ```
pub fn beautify_error_chain(error: &dyn StdError) -> Option<String> {
    let message = error.to_string();
    if message.trim().is_empty() {
        return None;
    }

    let mut lines = vec![format!("Error: {}", message)];
    let mut source = error.source();
    if source.is_some() {
        lines.push(String::new());
        lines.push("Caused by:".to_string());
    }
    while let Some(cause) = source {
        lines.push(format!("   ├─ {}", cause));
        source = cause.source();
    }

    Some(lines.join("\n"))
}

/// `AppError::Status`를 생성하고 에러 로그를 남깁니다.
///
/// # Arguments
///
/// * `message` - 에러 메시지
/// * `code` - HTTP 상태 코드 (기본값 500)
/// * `service` - 에러가 발생한 서비스 이름
///
/// # Examples
///
/// ```rust,ignore
/// return Err(report_error("User not found", Some(404), Some("UserService")));
/// ```
pub fn report_error(message: impl Into<String>, code: Option<u16>, service: Option<&str>) -> AppError {
    let message = message.into();

    match service {
        Some(service) => log::error!(target: "error-handler", "[{}] {}", service, message),
        None => log::error!(target: "error-handler", "{}", message),
    }

    AppError::Status {
        code: code.unwrap_or(500),
        message,
        service: service.map(str::to_string),
    }
}
