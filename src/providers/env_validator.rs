//! 환경 변수 검증 프로바이더
//!
//! `.env` 파일에 선언된 모든 키가 현재 프로세스 환경에 설정되어 있는지
//! 확인합니다. 누락된 키가 있으면 프로세스를 종료하지 않고 `AppError`를 반환하여
//! 부팅 코드가 처리 방법을 결정하도록 합니다.

use std::env;
use std::path::Path;

use crate::errors::{AppError, AppResult, ErrorContext};

/// 환경 변수 조회/검증기
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvValidator;

impl EnvValidator {
    /// 환경 변수를 조회합니다.
    ///
    /// 설정되지 않았거나 빈 값이면 `default`를 반환합니다.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let port = EnvValidator.get("PORT", Some("8080"));
    /// ```
    pub fn get(&self, key: &str, default: Option<&str>) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|value| !value.is_empty())
            .or_else(|| default.map(str::to_string))
    }

    /// env 파일에 선언된 모든 키가 설정되어 있는지 검증합니다.
    ///
    /// # Errors
    ///
    /// * `AppError::InternalError` - 파일을 읽거나 파싱할 수 없는 경우
    /// * `AppError::ValidationError` - 설정되지 않았거나 빈 값인 키가 있는 경우
    pub fn check_all(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        #[allow(deprecated)]
        let entries = dotenv::from_path_iter(path)
            .with_context(|| format!("Failed to read env file {}", path.display()))?;

        let mut missing = Vec::new();
        for entry in entries {
            let (key, _) = entry.with_context(|| format!("Failed to parse env file {}", path.display()))?;
            if self.get(&key, None).is_none() {
                missing.push(key);
            }
        }

        if missing.is_empty() {
            return Ok(());
        }

        log::error!("Missing environment variables: {}", missing.join(", "));
        Err(AppError::ValidationError(format!(
            "Missing environment variables: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_env_file(contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("app_composer_{}.env", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_get_existing_variable() {
        assert!(EnvValidator.get("PATH", None).is_some());
    }

    #[test]
    fn test_get_missing_variable_uses_default() {
        let key = "APP_COMPOSER_SURELY_MISSING";
        assert_eq!(EnvValidator.get(key, Some("defaultValue")), Some("defaultValue".to_string()));
        assert_eq!(EnvValidator.get(key, None), None);
    }

    #[test]
    fn test_check_all_passes_when_every_key_is_set() {
        let path = write_env_file("PATH=/usr/bin\n");
        assert!(EnvValidator.check_all(&path).is_ok());
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_check_all_reports_missing_keys() {
        let path = write_env_file("PATH=/usr/bin\nAPP_COMPOSER_MISSING_ONE=1\nAPP_COMPOSER_MISSING_TWO=2\n");

        let error = EnvValidator.check_all(&path).unwrap_err();
        assert_eq!(
            error,
            AppError::ValidationError(
                "Missing environment variables: APP_COMPOSER_MISSING_ONE, APP_COMPOSER_MISSING_TWO".to_string()
            )
        );
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_check_all_missing_file() {
        let result = EnvValidator.check_all("/definitely/not/here/.env");
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
