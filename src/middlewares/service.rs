//! # Middleware Pipeline Manager
//!
//! 순서가 보장되고 중복이 제거된 미들웨어 파이프라인을 조립합니다.
//!
//! ## 슬롯 설치 규칙
//!
//! ```text
//! add_xxx(options)
//!    ├─ 1. 같은 이름의 슬롯이 이미 있음 → warn "[xxx] already exists. Skipping..." → DuplicateSlot
//!    ├─ 2. 설치하면 동작하지 않는 옵션    → InvalidTunable
//!    ├─ 3. 리졸버가 유닛을 만들지 못함    → Unavailable (로그 없음)
//!    └─ 4. MiddlewareEntry{timestamp, unit} 추가 → Installed
//! ```
//!
//! 어떤 `add_xxx`도 예상된 상황(중복, 선택적 의존성 부재, 잘못된 옵션)에서
//! 에러를 반환하지 않습니다. 리졸버 팩토리의 패닉만 그대로 전파됩니다.
//!
//! ## 사용 예제
//!
//! ```rust,ignore
//! let mut middleware = MiddlewareService::default();
//!
//! middleware.add_body_parser(Some(BodyParserOptions { limit: "1mb".into() }));
//! middleware.add_cors(None);
//! middleware.add_middleware(PipelineUnit::route("/api", vec![audit_unit]));
//! middleware.set_error_handler(Some(ErrorHandlerOptions { show_stack_trace: true, ..Default::default() }));
//!
//! middleware.view_middleware_pipeline();
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::handler::{ErrorHandler, ErrorHandlerOptions};
use crate::middlewares::options::{
    to_arg, BodyParserOptions, CompressionOptions, CookieParserOptions, CookieSessionOptions, CorsOptions,
    MulterOptions, RateLimiterOptions, SessionOptions, StaticOptions, UrlEncodedParserOptions,
};
use crate::middlewares::pipeline::{MiddlewareEntry, MiddlewareUnit, PipelineRow, PipelineUnit};
use crate::middlewares::resolver::MiddlewareResolver;
use crate::providers::logger::{LogSink, Logger};
use crate::utils::display_terminal::{print_boxed_title, print_table};

const ORIGIN: &str = "configure-service";

/// 슬롯 설치 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// 파이프라인에 추가됨
    Installed,
    /// 같은 슬롯(이름, 호출 대상 또는 경로)이 이미 설치되어 있음
    DuplicateSlot,
    /// 리졸버가 유닛을 만들 수 없음 (선택적 의존성 부재)
    Unavailable,
    /// 설치하면 동작하지 않는 옵션 값
    InvalidTunable,
    /// 미들웨어가 없는 경로 그룹
    EmptyRoute,
}

impl InstallOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, InstallOutcome::Installed)
    }
}

/// 미들웨어 파이프라인 관리자
pub struct MiddlewareService {
    resolver: MiddlewareResolver,
    logger: Arc<dyn LogSink>,
    pipeline: Vec<MiddlewareEntry>,
    /// 설치된 슬롯 태그 (유닛 이름과 무관)
    installed_slots: HashSet<String>,
    multer: Option<MiddlewareUnit>,
    error_handler: Option<ErrorHandler>,
}

impl Default for MiddlewareService {
    /// 링크된 통합과 기본 로거를 사용합니다.
    fn default() -> Self {
        Self::new(MiddlewareResolver::with_linked_integrations(), Arc::new(Logger))
    }
}

impl MiddlewareService {
    pub fn new(resolver: MiddlewareResolver, logger: Arc<dyn LogSink>) -> Self {
        Self {
            resolver,
            logger,
            pipeline: Vec::new(),
            installed_slots: HashSet::new(),
            multer: None,
            error_handler: None,
        }
    }

    pub fn resolver(&self) -> &MiddlewareResolver {
        &self.resolver
    }

    /// JSON 본문 파서를 설치합니다. (기본 limit `"100kb"`)
    pub fn add_body_parser(&mut self, options: Option<BodyParserOptions>) -> InstallOutcome {
        self.install_slot("bodyParser", vec![to_arg(&options.unwrap_or_default())])
    }

    /// URL-encoded 폼 파서를 설치합니다.
    ///
    /// `parameter_limit`이 0 이하이면 리졸버를 호출하지 않고 건너뜁니다.
    pub fn add_url_encoded_parser(&mut self, options: Option<UrlEncodedParserOptions>) -> InstallOutcome {
        let options = options.unwrap_or_default();
        self.install_checked("urlencodedParser", options.parameter_limit > 0, vec![to_arg(&options)])
    }

    pub fn add_cors(&mut self, options: Option<CorsOptions>) -> InstallOutcome {
        self.install_slot("cors", vec![to_arg(&options.unwrap_or_default())])
    }

    pub fn add_compression(&mut self, options: Option<CompressionOptions>) -> InstallOutcome {
        self.install_slot("compression", vec![to_arg(&options.unwrap_or_default())])
    }

    pub fn add_cookie_parser(&mut self, options: Option<CookieParserOptions>) -> InstallOutcome {
        self.install_slot("cookieParser", vec![to_arg(&options.unwrap_or_default())])
    }

    pub fn add_cookie_session(&mut self, options: Option<CookieSessionOptions>) -> InstallOutcome {
        self.install_slot("cookieSession", vec![to_arg(&options.unwrap_or_default())])
    }

    pub fn add_rate_limiter(&mut self, options: Option<RateLimiterOptions>) -> InstallOutcome {
        self.install_slot("rateLimiter", vec![to_arg(&options.unwrap_or_default())])
    }

    /// 세션 미들웨어를 설치합니다.
    ///
    /// 옵션이 없거나 `secret`이 비어 있으면 건너뜁니다.
    pub fn add_session(&mut self, options: Option<SessionOptions>) -> InstallOutcome {
        let options = options.unwrap_or_default();
        let usable = !options.secret.trim().is_empty();
        self.install_checked("session", usable, vec![to_arg(&options)])
    }

    /// `/favicon.ico` 요청에 아이콘 파일을 응답하는 미들웨어를 설치합니다.
    pub fn add_serve_favicon(&mut self, path: &str) -> InstallOutcome {
        self.install_slot("serveFavicon", vec![Value::from(path)])
    }

    /// 정적 파일 제공 미들웨어를 설치합니다.
    pub fn serve_static(&mut self, root: &str, options: Option<StaticOptions>) -> InstallOutcome {
        self.install_slot(
            "static",
            vec![Value::from(root), to_arg(&options.unwrap_or_default())],
        )
    }

    /// 파일 업로드 미들웨어를 준비하고 핸들을 반환합니다.
    ///
    /// 라우트 단위로 연결하기 위한 핸들이므로 전역 파이프라인에는 추가되지 않습니다.
    /// 이미 준비되었거나 사용할 수 없으면 `None`입니다.
    pub fn setup_multer(&mut self, options: Option<MulterOptions>) -> Option<MiddlewareUnit> {
        if self.multer.is_some() {
            self.warn_duplicate("multer");
            return None;
        }

        let unit = self.resolver.resolve("multer", &[to_arg(&options.unwrap_or_default())])?;
        self.multer = Some(unit.clone());
        Some(unit)
    }

    /// 사용자 미들웨어 또는 경로 그룹을 추가합니다.
    ///
    /// * 빈 경로 그룹 → warn `"No middlewares in the route [<path>]. Skipping..."`
    /// * 이미 있는 경로 → warn `"[<path>] route already exists. Skipping..."`
    /// * 이름 또는 호출 대상이 같은 유닛 → warn `"[<name>] already exists. Skipping..."`
    pub fn add_middleware(&mut self, unit: impl Into<PipelineUnit>) -> InstallOutcome {
        let unit = unit.into();

        match &unit {
            PipelineUnit::Route { path, middlewares } if middlewares.is_empty() => {
                self.logger
                    .warn(&format!("No middlewares in the route [{}]. Skipping...", path), ORIGIN);
                return InstallOutcome::EmptyRoute;
            }
            PipelineUnit::Route { path, .. } if self.has_route(path) => {
                self.logger
                    .warn(&format!("[{}] route already exists. Skipping...", path), ORIGIN);
                return InstallOutcome::DuplicateSlot;
            }
            PipelineUnit::Single(single) if self.has_unit(single) => {
                self.warn_duplicate(single.name());
                return InstallOutcome::DuplicateSlot;
            }
            _ => {}
        }

        self.append(unit);
        InstallOutcome::Installed
    }

    /// 에러 핸들러를 설정합니다. 마지막 호출이 적용됩니다.
    ///
    /// `None`이거나 `error_handler`가 없으면 기본 핸들러를 사용합니다.
    pub fn set_error_handler(&mut self, options: Option<ErrorHandlerOptions>) {
        self.error_handler = Some(ErrorHandler::from_options(options));
    }

    /// 설정된 에러 핸들러 (설정되지 않았으면 기본 핸들러)
    pub fn get_error_handler(&self) -> ErrorHandler {
        self.error_handler.clone().unwrap_or_default()
    }

    /// 삽입 순서의 파이프라인
    pub fn get_middleware_pipeline(&self) -> &[MiddlewareEntry] {
        &self.pipeline
    }

    pub fn len(&self) -> usize {
        self.pipeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipeline.is_empty()
    }

    /// 파이프라인 진단 테이블을 출력하고 행 목록을 반환합니다.
    pub fn view_middleware_pipeline(&self) -> Vec<PipelineRow> {
        let rows: Vec<PipelineRow> = self.pipeline.iter().map(MiddlewareEntry::to_row).collect();

        if rows.is_empty() {
            self.logger.info("Middleware pipeline is empty", ORIGIN);
            return rows;
        }

        print_boxed_title("MIDDLEWARE PIPELINE");
        print_table(
            &["timestamp", "path", "middleware"],
            rows.iter()
                .map(|row| vec![row.timestamp.clone(), row.path.clone(), row.middleware.clone()])
                .collect(),
        );

        rows
    }

    fn install_slot(&mut self, slot: &str, args: Vec<Value>) -> InstallOutcome {
        self.install_checked(slot, true, args)
    }

    fn install_checked(&mut self, slot: &str, usable: bool, args: Vec<Value>) -> InstallOutcome {
        if self.has_slot(slot) {
            self.warn_duplicate(slot);
            return InstallOutcome::DuplicateSlot;
        }

        if !usable {
            log::debug!(target: ORIGIN, "[{}] options are not usable. Skipping...", slot);
            return InstallOutcome::InvalidTunable;
        }

        match self.resolver.resolve(slot, &args) {
            Some(unit) => {
                self.installed_slots.insert(slot.to_string());
                self.append(PipelineUnit::Single(unit));
                InstallOutcome::Installed
            }
            None => InstallOutcome::Unavailable,
        }
    }

    fn append(&mut self, unit: PipelineUnit) {
        let timestamp = self.next_timestamp();
        self.pipeline.push(MiddlewareEntry::new(timestamp, unit));
    }

    /// 마지막 엔트리보다 이르지 않은 현재 시각
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.pipeline.last() {
            Some(last) if last.timestamp() > now => last.timestamp(),
            _ => now,
        }
    }

    fn warn_duplicate(&self, slot: &str) {
        self.logger
            .warn(&format!("[{}] already exists. Skipping...", slot), ORIGIN);
    }

    fn has_slot(&self, slot: &str) -> bool {
        self.installed_slots.contains(slot)
    }

    fn has_unit(&self, candidate: &MiddlewareUnit) -> bool {
        if self.has_slot(candidate.name()) {
            return true;
        }

        self.pipeline.iter().any(|entry| match entry.unit() {
            PipelineUnit::Single(unit) => unit.name() == candidate.name() || unit.same_callable(candidate),
            PipelineUnit::Route { .. } => false,
        })
    }

    fn has_route(&self, path: &str) -> bool {
        self.pipeline.iter().any(|entry| match entry.unit() {
            PipelineUnit::Route { path: existing, .. } => existing == path,
            PipelineUnit::Single(_) => false,
        })
    }
}

impl std::fmt::Debug for MiddlewareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareService")
            .field("resolver", &self.resolver)
            .field("pipeline", &self.pipeline)
            .field("error_handler", &self.error_handler)
            .finish()
    }
}
