//! # Container Error System
//!
//! 의존성 주입 컨테이너의 구성(composition)과 해석(resolution) 단계에서
//! 발생하는 치명적인 에러를 정의합니다.
//!
//! ## 에러 분류
//!
//! | ContainerError | 발생 시점 | 영향 범위 |
//! |----------------|-----------|-----------|
//! | `InvalidArgument` | 모듈 빌드 | 구성 중단 |
//! | `InvalidModule` | 컨테이너 생성 | `create` 전체가 원자적으로 실패 |
//! | `NotInitialized` | 컨테이너 조회 | 호출한 연산만 실패 |
//! | `ProviderNotRegistered` | 인스턴스 해석 | 호출한 연산만 실패 |
//! | `CircularDependency` | 인스턴스 해석 | 호출한 연산만 실패 |
//! | `TypeMismatch` | 인스턴스 해석 | 호출한 연산만 실패 |
//! | `Construction` | 인스턴스 생성 | 호출한 연산만 실패 |
//!
//! 미들웨어 파이프라인의 "예상된" 상황(중복 슬롯, 선택적 의존성 부재,
//! 잘못된 튜닝 값)은 에러가 아니라 [`crate::middlewares::InstallOutcome`]
//! 값과 로그로 보고됩니다.
//!
//! ## HTTP 응답 매핑
//!
//! 요청 처리 중 `ContainerError`가 핸들러 밖으로 전파되면 항상
//! 500 Internal Server Error로 응답하며, 내부 식별자는 노출하지 않습니다.

use thiserror::Error;

/// 컨테이너 구성/해석 에러
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// 잘못된 구성 입력 (예: 식별자가 비어 있는 서비스 디스크립터)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 컨테이너에 로드할 수 없는 모듈
    #[error("Invalid module: {0}")]
    InvalidModule(String),

    /// 컨테이너 생성 전에 조회를 시도함
    #[error("Container is not initialized")]
    NotInitialized,

    /// 해석 가능한 바인딩이 없는 식별자
    #[error("Provider {0} not registered")]
    ProviderNotRegistered(String),

    /// 해석 중인 식별자를 다시 요청함
    #[error("Circular dependency detected: {0} is already being resolved")]
    CircularDependency(String),

    /// 바인딩된 인스턴스 타입이 요청 타입과 다름
    #[error("Type mismatch for {identifier}: expected {expected}")]
    TypeMismatch {
        identifier: String,
        expected: &'static str,
    },

    /// 생성자 함수가 실패함
    #[error("Failed to construct {identifier}: {reason}")]
    Construction { identifier: String, reason: String },
}

impl ContainerError {
    /// 생성자 실패를 감싸는 헬퍼
    pub fn construction(identifier: impl ToString, reason: impl ToString) -> Self {
        ContainerError::Construction {
            identifier: identifier.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl actix_web::ResponseError for ContainerError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::InternalServerError().json(serde_json::json!({
            "code": 500,
            "error": "An unexpected error occurred."
        }))
    }
}

/// 컨테이너 연산 결과 타입 별칭
pub type ContainerResult<T> = Result<T, ContainerError>;
