//! 애플리케이션 컴포저 데모 서버
//!
//! 컨테이너 모듈을 적재하고 미들웨어 파이프라인을 조립한 뒤,
//! Actix-web HTTP 서버를 구동합니다.

use std::path::Path;
use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{middleware, web, App, Error, HttpMessage, HttpRequest, HttpResponse, HttpServer};
use app_composer::config::{load_env_file, AppInfo, Environment, ErrorConfig, ServerConfig};
use app_composer::core::{
    AppContainer, Container, ContainerError, ContainerOptions, ContainerResult, Lifetime, ModuleBuilder,
    ServiceDescriptor, ServiceIdentifier,
};
use app_composer::errors::{AppError, ErrorContext, ErrorHandlerOptions};
use app_composer::middlewares::{
    request_scope, Middleware, MiddlewareService, MiddlewareUnit, Next, ParsedBody, PipelineMiddleware, PipelineUnit,
};
use app_composer::providers::{EnvValidator, Logger, ProviderManager};
use app_composer::utils::display_terminal::{print_server_banner, print_sub_task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use env_logger::Env;
use log::{error, info, warn};
use serde_json::{json, Value};
use uuid::Uuid;

/// 서버 시작 시각 (싱글톤)
struct AppClock {
    started_at: DateTime<Utc>,
}

/// 요청 추적 정보 (요청 스코프)
struct RequestTrace {
    id: Uuid,
    received_at: DateTime<Utc>,
}

/// `/api` 경로 요청을 기록하는 미들웨어
struct RequestAudit;

#[async_trait(?Send)]
impl Middleware for RequestAudit {
    fn name(&self) -> &str {
        "requestAudit"
    }

    async fn handle(&self, req: ServiceRequest, next: Next) -> Result<ServiceResponse<BoxBody>, Error> {
        let method = req.method().clone();
        let path = req.path().to_string();
        let res = next.call(req).await?;
        info!("📝 {} {} → {}", method, path, res.status());
        Ok(res)
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 {} 시작중...", AppInfo::name());

    let container = build_container().map_err(into_io_error)?;
    register_providers(&container).map_err(into_io_error)?;

    let middlewares = configure_middlewares();
    middlewares.view_middleware_pipeline();

    info!("✅ 컨테이너와 미들웨어 파이프라인이 준비되었습니다!");

    start_http_server(container, &middlewares).await
}

/// 로깅 시스템을 초기화합니다
///
/// # Environment Variables
///
/// * `RUST_LOG` - 로깅 레벨 설정 (기본값: "info,actix_web=debug")
fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

/// 데모 서비스 모듈을 적재한 컨테이너를 생성합니다
fn build_container() -> ContainerResult<Arc<Container>> {
    let module = ModuleBuilder::build(
        vec![
            ServiceDescriptor::new(|_| {
                Ok(AppClock {
                    started_at: Utc::now(),
                })
            })
            .with_lifetime(Lifetime::Singleton),
            ServiceDescriptor::new(|_| {
                Ok(RequestTrace {
                    id: Uuid::new_v4(),
                    received_at: Utc::now(),
                })
            })
            .with_lifetime(Lifetime::RequestScoped),
        ],
        None,
    )?;

    let mut app_container = AppContainer::new(Some(ContainerOptions {
        default_scope: Lifetime::Singleton,
        ..ContainerOptions::default()
    }));
    let container = app_container.create(vec![module])?;
    app_container.view_container_bindings()?;

    Ok(container)
}

/// 장수명 프로바이더를 등록하고 환경 변수를 검증합니다
fn register_providers(container: &Arc<Container>) -> ContainerResult<ProviderManager> {
    let providers = ProviderManager::new(container.clone(), Arc::new(Logger));
    providers.register(&ServiceDescriptor::new(|_| Ok(Logger)), Some(Lifetime::Singleton))?;
    providers.register(&ServiceDescriptor::new(|_| Ok(EnvValidator)), Some(Lifetime::Singleton))?;

    let validator = providers.get::<EnvValidator>(&ServiceIdentifier::of::<EnvValidator>())?;
    let template = Path::new(".env.example");
    if template.exists() {
        if let Err(e) = validator.check_all(template) {
            warn!("⚠️ {}", e);
        }
    }

    Ok(providers)
}

/// 미들웨어 파이프라인을 조립합니다
///
/// 링크되지 않은 슬롯(`compression` 등)은 조용히 건너뜁니다.
fn configure_middlewares() -> MiddlewareService {
    let mut middlewares = MiddlewareService::default();

    let outcomes = [
        ("rateLimiter", middlewares.add_rate_limiter(None)),
        ("cors", middlewares.add_cors(None)),
        ("cookieParser", middlewares.add_cookie_parser(None)),
        ("bodyParser", middlewares.add_body_parser(None)),
        ("urlencodedParser", middlewares.add_url_encoded_parser(None)),
        ("compression", middlewares.add_compression(None)),
        (
            "/api",
            middlewares.add_middleware(PipelineUnit::route(
                "/api",
                vec![MiddlewareUnit::from_middleware(RequestAudit)],
            )),
        ),
    ];
    for (slot, outcome) in outcomes {
        print_sub_task(slot, &format!("{:?}", outcome));
    }

    middlewares.set_error_handler(Some(ErrorHandlerOptions {
        error_handler: None,
        show_stack_trace: ErrorConfig::show_stack_trace(),
    }));

    middlewares
}

/// HTTP 서버를 구성하고 실행합니다
///
/// # Errors
///
/// * `std::io::Error` - 포트 바인딩 실패 또는 서버 실행 오류
async fn start_http_server(container: Arc<Container>, middlewares: &MiddlewareService) -> std::io::Result<()> {
    let bind_address = ServerConfig::bind_address();
    let pipeline = PipelineMiddleware::new(container, middlewares);

    print_server_banner(
        &AppInfo::name(),
        &AppInfo::version(),
        ServerConfig::port(),
        Environment::current().as_str(),
    );
    info!("📍 Health check: http://{}/health", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(pipeline.clone())
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health))
            .route("/api/echo", web::post().to(echo))
    })
    .bind(&bind_address)?
    .run()
    .await
}

async fn health(req: HttpRequest) -> actix_web::Result<HttpResponse> {
    let scope = request_scope(&req).ok_or_else(|| AppError::InternalError("request scope is not available".into()))?;
    let clock = scope.get::<AppClock>(&ServiceIdentifier::of::<AppClock>())?;
    let trace = scope
        .get::<RequestTrace>(&ServiceIdentifier::of::<RequestTrace>())
        .context("request trace")?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "requestId": trace.id,
        "receivedAt": trace.received_at,
        "uptimeSeconds": (Utc::now() - clock.started_at).num_seconds(),
    })))
}

async fn echo(req: HttpRequest) -> HttpResponse {
    let body = req
        .extensions()
        .get::<ParsedBody>()
        .map(|parsed| parsed.0.clone())
        .unwrap_or(Value::Null);

    HttpResponse::Ok().json(json!({ "received": body }))
}

fn into_io_error(e: ContainerError) -> std::io::Error {
    error!("컨테이너 초기화 실패: {}", e);
    std::io::Error::other(e.to_string())
}
