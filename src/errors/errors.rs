//! 애플리케이션 전역에서 사용하는 HTTP 에러 시스템
//!
//! `thiserror`와 `actix_web::ResponseError`를 사용하여 핸들러와 미들웨어가
//! 일관된 JSON 에러 응답(`{code, error}`)을 반환하도록 합니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! use crate::errors::{AppError, AppResult};
//!
//! async fn find_user(id: &str) -> AppResult<User> {
//!     if id.is_empty() {
//!         return Err(AppError::ValidationError("User id is required".to_string()));
//!     }
//!
//!     repo.find(id).ok_or_else(|| AppError::NotFound(format!("User {}", id)))
//! }
//! ```

use actix_web::http::StatusCode;
use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 핸들러/미들웨어에서 발생하는 에러를 HTTP 응답으로 변환합니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// 입력값 검증 에러 (400 Bad Request)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러 (404 Not Found)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 요청 본문 크기 초과 (413 Payload Too Large)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// 요청 빈도 초과 (429 Too Many Requests)
    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    /// 내부 서버 에러 (500 Internal Server Error)
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// 임의의 상태 코드와 발생 서비스 이름을 가진 에러
    ///
    /// [`crate::errors::report_error`]가 생성합니다.
    #[error("{message}")]
    Status {
        code: u16,
        message: String,
        service: Option<String>,
    },
}

impl AppError {
    /// 응답 본문의 `error` 필드에 들어갈 메시지
    pub fn message(&self) -> &str {
        match self {
            AppError::ValidationError(message)
            | AppError::NotFound(message)
            | AppError::PayloadTooLarge(message)
            | AppError::TooManyRequests(message)
            | AppError::InternalError(message) => message,
            AppError::Status { message, .. } => message,
        }
    }

    /// 에러를 발생시킨 서비스 이름
    pub fn service(&self) -> Option<&str> {
        match self {
            AppError::Status { service, .. } => service.as_deref(),
            _ => None,
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Status { code, .. } => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// `{code, error}` 형태의 JSON 응답을 생성합니다.
    fn error_response(&self) -> actix_web::HttpResponse {
        let status = self.status_code();

        actix_web::HttpResponse::build(status).json(serde_json::json!({
            "code": status.as_u16(),
            "error": self.message()
        }))
    }
}

/// 편의성을 위한 Result 타입 별칭
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;
    use actix_web::body::MessageBody;

    fn body_json(error: &AppError) -> serde_json::Value {
        let bytes = error.error_response().into_body().try_into_bytes().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("Email is required".to_string());
        assert_eq!(error.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&error),
            serde_json::json!({ "code": 400, "error": "Email is required" })
        );
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("User not found".to_string());
        assert_eq!(error.error_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_payload_and_rate_limit_responses() {
        assert_eq!(
            AppError::PayloadTooLarge("body".to_string()).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::TooManyRequests("slow down".to_string()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_status_error_uses_its_code() {
        let error = AppError::Status {
            code: 418,
            message: "I'm a teapot".to_string(),
            service: Some("KitchenService".to_string()),
        };

        assert_eq!(error.status_code().as_u16(), 418);
        assert_eq!(error.to_string(), "I'm a teapot");
        assert_eq!(error.service(), Some("KitchenService"));
        assert_eq!(body_json(&error)["code"], 418);
    }

    #[test]
    fn test_invalid_status_code_falls_back_to_500() {
        let error = AppError::Status {
            code: 42,
            message: "broken".to_string(),
            service: None,
        };
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        if let Err(AppError::InternalError(msg)) = app_result {
            assert!(msg.contains("Additional context"));
            assert!(msg.contains("original error"));
        } else {
            panic!("Expected InternalError");
        }
    }
}
