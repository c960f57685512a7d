//! 미들웨어 슬롯별 옵션
//!
//! 옵션은 JSON 값으로 직렬화되어 리졸버의 생성 인자로 전달됩니다.
//! 필드 이름은 camelCase로 직렬화되며, 누락된 필드는 기본값을 사용합니다.

use serde::{Deserialize, Serialize};

/// `bodyParser` 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BodyParserOptions {
    /// 최대 본문 크기 (`"100kb"`, `"1mb"`, `"512"` 등)
    pub limit: String,
}

impl Default for BodyParserOptions {
    fn default() -> Self {
        Self {
            limit: "100kb".to_string(),
        }
    }
}

/// `urlencodedParser` 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UrlEncodedParserOptions {
    pub extended: bool,
    /// 허용되는 최대 파라미터 수 (0 이하이면 설치하지 않음)
    pub parameter_limit: i64,
    pub limit: String,
}

impl Default for UrlEncodedParserOptions {
    fn default() -> Self {
        Self {
            extended: true,
            parameter_limit: 1000,
            limit: "100kb".to_string(),
        }
    }
}

/// `cors` 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsOptions {
    /// 허용 Origin 목록 (비어 있으면 `*`)
    pub origin: Vec<String>,
    pub methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub credentials: bool,
    /// Preflight 캐시 시간 (초)
    pub max_age: Option<u64>,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            origin: Vec::new(),
            methods: ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"]
                .iter()
                .map(|method| method.to_string())
                .collect(),
            allowed_headers: Vec::new(),
            credentials: false,
            max_age: None,
        }
    }
}

/// `compression` 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressionOptions {
    pub level: Option<i32>,
    pub threshold: Option<String>,
}

/// `cookieParser` 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookieParserOptions {
    pub secret: Option<String>,
}

/// `cookieSession` 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CookieSessionOptions {
    pub name: String,
    pub keys: Vec<String>,
    /// 쿠키 유효 시간 (밀리초)
    pub max_age: Option<u64>,
}

impl Default for CookieSessionOptions {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            keys: Vec::new(),
            max_age: None,
        }
    }
}

/// `rateLimiter` 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimiterOptions {
    /// 윈도우 길이 (밀리초)
    pub window_ms: u64,
    /// 윈도우당 허용 요청 수 (0이면 설치하지 않음)
    pub max: u32,
    pub message: String,
}

impl Default for RateLimiterOptions {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max: 100,
            message: "Too many requests, please try again later.".to_string(),
        }
    }
}

/// `session` 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionOptions {
    /// 세션 서명 비밀값 (비어 있으면 설치하지 않음)
    pub secret: String,
    pub resave: bool,
    pub save_uninitialized: bool,
}

/// `static` 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaticOptions {
    pub index: Option<String>,
    /// 캐시 유효 시간 (초)
    pub max_age: Option<u64>,
}

/// `multer` 옵션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MulterOptions {
    /// 업로드 파일 저장 경로
    pub dest: Option<String>,
    /// 파일당 최대 크기 (바이트)
    pub file_size_limit: Option<u64>,
}

/// 옵션을 리졸버 인자로 변환합니다.
pub(crate) fn to_arg<T: Serialize>(options: &T) -> serde_json::Value {
    serde_json::to_value(options).unwrap_or(serde_json::Value::Null)
}

/// 리졸버 인자를 옵션으로 복원합니다. 인자가 없거나 형식이 맞지 않으면 `None`입니다.
pub(crate) fn from_arg<T: for<'de> Deserialize<'de> + Default>(args: &[serde_json::Value], index: usize) -> Option<T> {
    match args.get(index) {
        None | Some(serde_json::Value::Null) => Some(T::default()),
        Some(value) => serde_json::from_value(value.clone()).ok(),
    }
}
