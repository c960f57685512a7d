//! HTTP 에러 타입과 에러 핸들러 슬롯
//!
//! - [`errors`] - `AppError`, `AppResult`, `ErrorContext`
//! - [`handler`] - `ErrorHandler`, `default_error_handler`, `report_error`

pub mod errors;
pub mod handler;

pub use errors::*;
pub use handler::*;
