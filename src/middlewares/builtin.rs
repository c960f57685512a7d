//! # Built-in Middleware Integrations
//!
//! 바이너리에 기본으로 링크되는 미들웨어 통합입니다. 각 통합은
//! `inventory::submit!`으로 자신의 태그를 등록하므로
//! [`MiddlewareResolver::with_linked_integrations`](crate::middlewares::resolver::MiddlewareResolver::with_linked_integrations)
//! 로 바로 사용할 수 있습니다.
//!
//! | 태그 | 동작 |
//! |------|------|
//! | `bodyParser` | `application/json` 본문을 파싱하여 [`ParsedBody`]로 저장 |
//! | `urlencodedParser` | `application/x-www-form-urlencoded` 본문을 [`ParsedForm`]으로 저장 |
//! | `cors` | `actix-cors` 정책을 남은 체인에 적용 |
//! | `cookieParser` | `Cookie` 헤더를 [`ParsedCookies`]로 저장 |
//! | `rateLimiter` | 클라이언트 IP 기준 `governor` 요청 제한 |
//! | `serveFavicon` | `/favicon.ico` 응답 |
//!
//! 나머지 슬롯(`compression`, `session`, `static`, `multer` 등)은 애플리케이션이
//! `MiddlewareResolver::register`로 직접 연결합니다.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_cors::{Cors, CorsError};
use actix_web::body::BoxBody;
use actix_web::dev::{always_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::http::Method;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::{FutureExt, StreamExt};
use governor::clock::DefaultClock;
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use serde_json::Value;

use crate::errors::AppError;
use crate::middlewares::options::{
    from_arg, BodyParserOptions, CookieParserOptions, CorsOptions, RateLimiterOptions, UrlEncodedParserOptions,
};
use crate::middlewares::pipeline::{MiddlewareFuture, MiddlewareUnit, Next};
use crate::middlewares::resolver::MiddlewareIntegration;

/// `bodyParser`가 저장하는 JSON 본문
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

/// `urlencodedParser`가 저장하는 폼 필드 (입력 순서 유지)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedForm(pub Vec<(String, String)>);

impl ParsedForm {
    /// 이름이 일치하는 첫 번째 값
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// `cookieParser`가 저장하는 쿠키
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCookies(pub HashMap<String, String>);

impl ParsedCookies {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// `"100kb"`, `"1mb"`, `"512"` 형식의 크기를 바이트로 변환합니다.
///
/// 단위는 `b`, `kb`, `mb`, `gb` (대소문자 무시, 1024 배수)이며 단위가 없으면 바이트입니다.
///
/// # Examples
///
/// ```rust,ignore
/// assert_eq!(parse_size_limit("100kb"), Some(102_400));
/// assert_eq!(parse_size_limit("1.5mb"), Some(1_572_864));
/// assert_eq!(parse_size_limit("lots"), None);
/// ```
pub fn parse_size_limit(limit: &str) -> Option<usize> {
    let limit = limit.trim().to_ascii_lowercase();
    let split = limit
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(limit.len());
    let (number, unit) = limit.split_at(split);

    let number: f64 = number.trim().parse().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }

    let multiplier: f64 = match unit.trim() {
        "" | "b" => 1.0,
        "kb" => 1024.0,
        "mb" => 1024.0 * 1024.0,
        "gb" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };

    Some((number * multiplier) as usize)
}

/// 요청 본문을 최대 `limit` 바이트까지 읽고, 이후 단계에서 다시 읽을 수 있도록 되돌려 놓습니다.
async fn read_limited_body(req: &mut ServiceRequest, limit: usize) -> Result<Bytes, Error> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared.is_some_and(|length| length > limit) {
        return Err(payload_too_large(limit).into());
    }

    let mut payload = req.take_payload();
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(payload_too_large(limit).into());
        }
        body.extend_from_slice(&chunk);
    }

    let body = body.freeze();
    req.set_payload(Payload::from(body.clone()));
    Ok(body)
}

fn payload_too_large(limit: usize) -> AppError {
    AppError::PayloadTooLarge(format!("Request body exceeds the limit of {} bytes", limit))
}

fn has_content_type(req: &ServiceRequest, expected: &str) -> bool {
    req.content_type().eq_ignore_ascii_case(expected)
}

// ---------------------------------------------------------------------------
// bodyParser
// ---------------------------------------------------------------------------

fn body_parser_factory(args: &[Value]) -> Option<MiddlewareUnit> {
    let options: BodyParserOptions = from_arg(args, 0)?;
    let limit = parse_size_limit(&options.limit)?;

    Some(MiddlewareUnit::new("bodyParser", move |mut req: ServiceRequest, next: Next| async move {
        if has_content_type(&req, "application/json") {
            let body = read_limited_body(&mut req, limit).await?;
            if !body.is_empty() {
                let value: Value = serde_json::from_slice(&body)
                    .map_err(|e| AppError::ValidationError(format!("Invalid JSON body: {}", e)))?;
                req.extensions_mut().insert(ParsedBody(value));
            }
        }
        next.call(req).await
    }))
}

// ---------------------------------------------------------------------------
// urlencodedParser
// ---------------------------------------------------------------------------

fn url_encoded_parser_factory(args: &[Value]) -> Option<MiddlewareUnit> {
    let options: UrlEncodedParserOptions = from_arg(args, 0)?;
    if options.parameter_limit <= 0 {
        return None;
    }
    let parameter_limit = usize::try_from(options.parameter_limit).ok()?;
    let limit = parse_size_limit(&options.limit)?;

    Some(MiddlewareUnit::new(
        "urlencodedParser",
        move |mut req: ServiceRequest, next: Next| async move {
            if has_content_type(&req, "application/x-www-form-urlencoded") {
                let body = read_limited_body(&mut req, limit).await?;
                let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)
                    .map_err(|e| AppError::ValidationError(format!("Invalid form body: {}", e)))?;
                if fields.len() > parameter_limit {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Too many parameters (limit {})",
                        parameter_limit
                    ))
                    .into());
                }
                req.extensions_mut().insert(ParsedForm(fields));
            }
            next.call(req).await
        },
    ))
}

// ---------------------------------------------------------------------------
// cors
// ---------------------------------------------------------------------------

/// 남은 체인을 actix 서비스로 노출합니다.
///
/// `actix-cors`의 `Transform`을 유닛 안에서 감쌀 때 내부 서비스로 사용합니다.
struct ContinueService(Option<Next>);

impl Service<ServiceRequest> for ContinueService {
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = MiddlewareFuture;

    always_ready!();

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.0.clone() {
            Some(next) => next.call(req),
            None => Box::pin(async {
                Err(AppError::InternalError("no pipeline to continue".to_string()).into())
            }),
        }
    }
}

/// 옵션으로 `actix-cors` 정책을 만듭니다.
///
/// Origin 목록이 비어 있거나 `*`를 포함하면 모든 Origin을 허용합니다.
/// credentials를 허용하면 와일드카드 대신 요청 Origin을 그대로 돌려줍니다.
fn build_cors(options: &CorsOptions) -> Cors {
    let any_origin = options.origin.is_empty() || options.origin.iter().any(|origin| origin == "*");

    let mut cors = if any_origin {
        let cors = Cors::default().allow_any_origin();
        if options.credentials { cors } else { cors.send_wildcard() }
    } else {
        options
            .origin
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors = cors.allowed_methods(options.methods.iter().map(String::as_str));
    cors = if options.allowed_headers.is_empty() {
        cors.allow_any_header()
    } else {
        cors.allowed_headers(options.allowed_headers.iter().map(String::as_str))
    };
    if options.credentials {
        cors = cors.supports_credentials();
    }

    cors.max_age(options.max_age.and_then(|seconds| usize::try_from(seconds).ok()))
}

fn cors_factory(args: &[Value]) -> Option<MiddlewareUnit> {
    let options: CorsOptions = from_arg(args, 0)?;

    // 잘못된 Origin, 메서드, 헤더 이름은 Transform 생성 단계에서 거부됨
    if !matches!(build_cors(&options).new_transform(ContinueService(None)).now_or_never(), Some(Ok(_))) {
        log::warn!(target: "configure-service", "[cors] options are not usable: {:?}", options);
        return None;
    }
    let options = Arc::new(options);

    Some(MiddlewareUnit::new("cors", move |req: ServiceRequest, next: Next| {
        let options = options.clone();
        async move {
            let cors = build_cors(&options)
                .new_transform(ContinueService(Some(next)))
                .await
                .map_err(|_| AppError::InternalError("CORS policy could not be built".to_string()))?;
            let res = cors.call(req).await?.map_into_boxed_body();

            // 거부 응답은 에러 핸들러가 400으로 렌더링하도록 AppError로 전달
            if let Some(rejection) = res.response().error().and_then(|e| e.as_error::<CorsError>()) {
                return Err(AppError::ValidationError(rejection.to_string()).into());
            }
            Ok(res)
        }
    }))
}

// ---------------------------------------------------------------------------
// cookieParser
// ---------------------------------------------------------------------------

fn cookie_parser_factory(args: &[Value]) -> Option<MiddlewareUnit> {
    // 서명 쿠키는 지원하지 않으므로 secret은 형식만 검사
    let _options: CookieParserOptions = from_arg(args, 0)?;

    Some(MiddlewareUnit::new("cookieParser", |req: ServiceRequest, next: Next| async move {
        // 퍼센트 디코딩되며 파싱할 수 없는 쿠키는 제외됨
        let cookies: HashMap<String, String> = match req.cookies() {
            Ok(cookies) => cookies
                .iter()
                .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
                .collect(),
            Err(e) => return Err(AppError::ValidationError(format!("Invalid Cookie header: {}", e)).into()),
        };
        req.extensions_mut().insert(ParsedCookies(cookies));
        next.call(req).await
    }))
}

// ---------------------------------------------------------------------------
// rateLimiter
// ---------------------------------------------------------------------------

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock, StateInformationMiddleware>;

/// 이 횟수의 요청마다 다 채워진 키를 정리합니다.
const PRUNE_INTERVAL: usize = 1024;

/// 클라이언트 키별 GCRA 제한기
///
/// `window / max`마다 한 번씩 채워지고 최대 `max`번까지 몰아서 허용합니다.
struct ClientLimiter {
    limiter: KeyedLimiter,
    max: u32,
    checks: AtomicUsize,
}

impl ClientLimiter {
    /// `max`가 0이거나 윈도우가 너무 짧아 주기가 0이 되면 `None`입니다.
    fn new(window: Duration, max: u32) -> Option<Self> {
        let burst = NonZeroU32::new(max)?;
        let quota = Quota::with_period(window / max)?.allow_burst(burst);

        Some(Self {
            limiter: RateLimiter::keyed(quota).with_middleware::<StateInformationMiddleware>(),
            max,
            checks: AtomicUsize::new(0),
        })
    }

    /// 요청을 기록하고 남은 허용 횟수를 반환합니다. 한도를 넘으면 `None`입니다.
    fn check(&self, key: &str) -> Option<u32> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_INTERVAL == PRUNE_INTERVAL - 1 {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
        }

        self.limiter
            .check_key(&key.to_string())
            .ok()
            .map(|snapshot| snapshot.remaining_burst_capacity())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }
}

fn rate_limiter_factory(args: &[Value]) -> Option<MiddlewareUnit> {
    let options: RateLimiterOptions = from_arg(args, 0)?;
    let limiter = Arc::new(ClientLimiter::new(Duration::from_millis(options.window_ms), options.max)?);
    let message: Arc<str> = Arc::from(options.message);

    Some(MiddlewareUnit::new("rateLimiter", move |req: ServiceRequest, next: Next| {
        let limiter = limiter.clone();
        let message = message.clone();
        async move {
            let key = req
                .peer_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());

            let Some(remaining) = limiter.check(&key) else {
                log::debug!(target: "configure-service", "rate limit exceeded for {}", key);
                return Err(AppError::TooManyRequests(message.to_string()).into());
            };

            let mut res = next.call(req).await?;
            let headers = res.headers_mut();
            headers.insert(HeaderName::from_static("ratelimit-limit"), HeaderValue::from(limiter.max));
            headers.insert(HeaderName::from_static("ratelimit-remaining"), HeaderValue::from(remaining));
            Ok(res)
        }
    }))
}

// ---------------------------------------------------------------------------
// serveFavicon
// ---------------------------------------------------------------------------

const FAVICON_PATH: &str = "/favicon.ico";

fn serve_favicon_factory(args: &[Value]) -> Option<MiddlewareUnit> {
    let path = args.first()?.as_str()?;
    let icon = match std::fs::read(path) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => {
            log::warn!(target: "configure-service", "favicon [{}] could not be read: {}", path, e);
            return None;
        }
    };

    Some(MiddlewareUnit::new("serveFavicon", move |req: ServiceRequest, next: Next| {
        let icon = icon.clone();
        async move {
            if req.path() != FAVICON_PATH {
                return next.call(req).await;
            }

            let response = if req.method() == Method::GET || req.method() == Method::HEAD {
                HttpResponse::Ok()
                    .content_type("image/x-icon")
                    .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
                    .body(icon)
            } else {
                HttpResponse::MethodNotAllowed()
                    .insert_header((header::ALLOW, "GET, HEAD"))
                    .finish()
            };
            Ok(req.into_response(response))
        }
    }))
}

inventory::submit! {
    MiddlewareIntegration { tag: "bodyParser", factory: body_parser_factory }
}

inventory::submit! {
    MiddlewareIntegration { tag: "urlencodedParser", factory: url_encoded_parser_factory }
}

inventory::submit! {
    MiddlewareIntegration { tag: "cors", factory: cors_factory }
}

inventory::submit! {
    MiddlewareIntegration { tag: "cookieParser", factory: cookie_parser_factory }
}

inventory::submit! {
    MiddlewareIntegration { tag: "rateLimiter", factory: rate_limiter_factory }
}

inventory::submit! {
    MiddlewareIntegration { tag: "serveFavicon", factory: serve_favicon_factory }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::options::to_arg;
    use crate::middlewares::pipeline::{MiddlewareFuture, Terminal};
    use actix_web::body::{BoxBody, MessageBody};
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::test::TestRequest;
    use serde_json::json;
    use std::rc::Rc;

    /// 요청 확장에 저장된 파싱 결과를 JSON으로 응답하는 종단 핸들러
    fn echo_terminal() -> Terminal {
        Rc::new(|req: ServiceRequest| -> MiddlewareFuture {
            Box::pin(async move {
                let body = req.extensions().get::<ParsedBody>().map(|parsed| parsed.0.clone());
                let form = req.extensions().get::<ParsedForm>().map(|parsed| parsed.0.clone());
                let cookies = req.extensions().get::<ParsedCookies>().map(|parsed| parsed.0.clone());
                let response = HttpResponse::Ok().json(json!({
                    "body": body,
                    "form": form,
                    "cookies": cookies,
                }));
                Ok(req.into_response(response))
            })
        })
    }

    async fn run(unit: MiddlewareUnit, req: ServiceRequest) -> Result<ServiceResponse<BoxBody>, Error> {
        Next::new(vec![unit], echo_terminal()).call(req).await
    }

    async fn json_body(res: ServiceResponse<BoxBody>) -> Value {
        let bytes = res.into_body().try_into_bytes().unwrap_or_default();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn status_of(error: &Error) -> StatusCode {
        error.as_response_error().status_code()
    }

    #[test]
    fn test_parse_size_limit() {
        assert_eq!(parse_size_limit("100kb"), Some(102_400));
        assert_eq!(parse_size_limit("1MB"), Some(1_048_576));
        assert_eq!(parse_size_limit("1.5mb"), Some(1_572_864));
        assert_eq!(parse_size_limit("512"), Some(512));
        assert_eq!(parse_size_limit("10 b"), Some(10));
        assert_eq!(parse_size_limit("lots"), None);
        assert_eq!(parse_size_limit("10tb"), None);
        assert_eq!(parse_size_limit("-1kb"), None);
    }

    #[test]
    fn test_factories_reject_unusable_options() {
        assert!(body_parser_factory(&[json!({ "limit": "a lot" })]).is_none());
        assert!(url_encoded_parser_factory(&[to_arg(&UrlEncodedParserOptions {
            parameter_limit: 0,
            ..Default::default()
        })])
        .is_none());
        assert!(rate_limiter_factory(&[json!({ "windowMs": 0 })]).is_none());
        assert!(rate_limiter_factory(&[json!({ "max": 0 })]).is_none());
        assert!(cors_factory(&[json!({ "methods": ["NOT A METHOD"] })]).is_none());
        assert!(cors_factory(&[json!({ "allowedHeaders": ["bad header"] })]).is_none());
        assert!(serve_favicon_factory(&[]).is_none());
        assert!(serve_favicon_factory(&[json!("/definitely/not/here.ico")]).is_none());
    }

    #[actix_web::test]
    async fn test_body_parser_stores_json() {
        let unit = body_parser_factory(&[]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::json())
            .set_payload(r#"{"name":"composer"}"#)
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(json_body(res).await["body"], json!({ "name": "composer" }));
    }

    #[actix_web::test]
    async fn test_body_parser_rejects_invalid_json() {
        let unit = body_parser_factory(&[]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::json())
            .set_payload("{not json")
            .to_srv_request();

        let error = run(unit, req).await.err().unwrap();
        assert_eq!(status_of(&error), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_body_parser_enforces_limit() {
        let unit = body_parser_factory(&[json!({ "limit": "8b" })]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::json())
            .set_payload(r#"{"name":"composer"}"#)
            .to_srv_request();

        let error = run(unit, req).await.err().unwrap();
        assert_eq!(status_of(&error), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_body_parser_ignores_other_content_types() {
        let unit = body_parser_factory(&[]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::plaintext())
            .set_payload("{not json")
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(json_body(res).await["body"], Value::Null);
    }

    #[actix_web::test]
    async fn test_url_encoded_parser_stores_form() {
        let unit = url_encoded_parser_factory(&[]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::form_url_encoded())
            .set_payload("user=kim&lang=rust")
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(json_body(res).await["form"], json!([["user", "kim"], ["lang", "rust"]]));
    }

    #[actix_web::test]
    async fn test_url_encoded_parser_decodes_components() {
        let unit = url_encoded_parser_factory(&[]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::form_url_encoded())
            .set_payload("name=John+Doe&city=Seoul%20KR&flag&=empty")
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(
            json_body(res).await["form"],
            json!([["name", "John Doe"], ["city", "Seoul KR"], ["flag", ""], ["", "empty"]])
        );
    }

    #[actix_web::test]
    async fn test_url_encoded_parser_enforces_parameter_limit() {
        let options = UrlEncodedParserOptions {
            parameter_limit: 1,
            ..Default::default()
        };
        let unit = url_encoded_parser_factory(&[to_arg(&options)]).unwrap();
        let req = TestRequest::post()
            .insert_header(header::ContentType::form_url_encoded())
            .set_payload("a=1&b=2")
            .to_srv_request();

        let error = run(unit, req).await.err().unwrap();
        assert_eq!(status_of(&error), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn test_cors_wildcard_by_default() {
        let unit = cors_factory(&[]).unwrap();
        let req = TestRequest::get()
            .insert_header((header::ORIGIN, "https://app.example.com"))
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), "*");
    }

    #[actix_web::test]
    async fn test_cors_preflight_short_circuits() {
        let options = CorsOptions {
            origin: vec!["https://app.example.com".to_string()],
            max_age: Some(600),
            ..Default::default()
        };
        let unit = cors_factory(&[to_arg(&options)]).unwrap();
        let req = TestRequest::default()
            .method(Method::OPTIONS)
            .insert_header((header::ORIGIN, "https://app.example.com"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        let headers = res.headers();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example.com"
        );
        let methods = headers.get(header::ACCESS_CONTROL_ALLOW_METHODS).unwrap().to_str().unwrap();
        assert!(methods.contains("POST") && methods.contains("DELETE"));
        assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), "content-type");
        assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "600");
        assert!(headers.get(header::VARY).unwrap().to_str().unwrap().contains("Origin"));
        assert!(res.into_body().try_into_bytes().unwrap_or_default().is_empty());
    }

    #[actix_web::test]
    async fn test_cors_reaches_rest_of_chain_with_headers() {
        let options = CorsOptions {
            origin: vec!["https://app.example.com".to_string()],
            credentials: true,
            ..Default::default()
        };
        let unit = cors_factory(&[to_arg(&options)]).unwrap();
        let req = TestRequest::get()
            .insert_header((header::ORIGIN, "https://app.example.com"))
            .insert_header((header::COOKIE, "sid=abc"))
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://app.example.com"
        );
        assert_eq!(res.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
        assert_eq!(json_body(res).await["cookies"], Value::Null);
    }

    #[actix_web::test]
    async fn test_cors_unlisted_origin_is_rejected() {
        let options = CorsOptions {
            origin: vec!["https://app.example.com".to_string()],
            ..Default::default()
        };
        let unit = cors_factory(&[to_arg(&options)]).unwrap();
        let req = TestRequest::get()
            .insert_header((header::ORIGIN, "https://evil.example.com"))
            .to_srv_request();

        let error = run(unit, req).await.err().unwrap();
        assert_eq!(status_of(&error), StatusCode::BAD_REQUEST);
        assert!(matches!(error.as_error::<AppError>(), Some(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_cookie_parser_stores_cookies() {
        let unit = cookie_parser_factory(&[]).unwrap();
        let req = TestRequest::get()
            .insert_header((header::COOKIE, "sid=abc; theme=dark; note=hello%20world; broken"))
            .to_srv_request();

        let res = run(unit, req).await.unwrap();
        assert_eq!(
            json_body(res).await["cookies"],
            json!({ "sid": "abc", "theme": "dark", "note": "hello world" })
        );
    }

    #[actix_web::test]
    async fn test_rate_limiter_blocks_after_max() {
        let options = RateLimiterOptions {
            max: 2,
            message: "slow down".to_string(),
            ..Default::default()
        };
        let unit = rate_limiter_factory(&[to_arg(&options)]).unwrap();

        for remaining in ["1", "0"] {
            let res = run(unit.clone(), TestRequest::get().to_srv_request()).await.unwrap();
            assert_eq!(res.headers().get("ratelimit-remaining").unwrap(), remaining);
        }

        let error = run(unit, TestRequest::get().to_srv_request()).await.err().unwrap();
        assert_eq!(status_of(&error), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            error.as_error::<AppError>(),
            Some(&AppError::TooManyRequests("slow down".to_string()))
        );
    }

    #[test]
    fn test_client_limiter_is_keyed() {
        let limiter = ClientLimiter::new(Duration::from_secs(60), 1).unwrap();
        assert_eq!(limiter.check("a"), Some(0));
        assert_eq!(limiter.check("a"), None);
        assert_eq!(limiter.check("b"), Some(0));
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_client_limiter_prunes_refilled_keys() {
        let limiter = ClientLimiter::new(Duration::from_millis(1), 1).unwrap();
        for client in 0..PRUNE_INTERVAL - 1 {
            limiter.check(&format!("10.0.{}.{}", client / 256, client % 256));
        }
        assert_eq!(limiter.tracked_keys(), PRUNE_INTERVAL - 1);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(limiter.check("late"), Some(0));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[actix_web::test]
    async fn test_serve_favicon() {
        let path = std::env::temp_dir().join(format!("favicon-{}.ico", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"icon-bytes").unwrap();
        let unit = serve_favicon_factory(&[json!(path.to_string_lossy())]).unwrap();
        std::fs::remove_file(&path).unwrap();

        let res = run(unit.clone(), TestRequest::get().uri("/favicon.ico").to_srv_request())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "image/x-icon");
        assert_eq!(res.into_body().try_into_bytes().unwrap_or_default(), Bytes::from_static(b"icon-bytes"));

        let res = run(unit.clone(), TestRequest::post().uri("/favicon.ico").to_srv_request())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

        let res = run(unit, TestRequest::get().uri("/health").to_srv_request()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
    }
}
