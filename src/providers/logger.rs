//! 로깅 협력자
//!
//! 컨테이너와 미들웨어 파이프라인은 진단 메시지를 직접 출력하지 않고
//! [`LogSink`]를 통해 `(message, origin)` 쌍으로 전달합니다.
//! 기본 구현인 [`Logger`]는 origin을 로그 target으로 사용하여 `log` 크레이트로 전달합니다.
//!
//! ```text
//! [2025-01-01T00:00:00Z WARN  configure-service] [cors] already exists. Skipping...
//! ```

/// 진단 메시지 수신자
pub trait LogSink: Send + Sync {
    fn info(&self, message: &str, origin: &str);
    fn warn(&self, message: &str, origin: &str);
    fn error(&self, message: &str, origin: &str);
}

/// `log` 크레이트로 전달하는 기본 로거
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl LogSink for Logger {
    fn info(&self, message: &str, origin: &str) {
        log::info!(target: origin, "{}", message);
    }

    fn warn(&self, message: &str, origin: &str) {
        log::warn!(target: origin, "{}", message);
    }

    fn error(&self, message: &str, origin: &str) {
        log::error!(target: origin, "{}", message);
    }
}
