use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::path::PathBuf;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod backend;
pub mod config;
pub mod cookies;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod models;

// Console API routers (Public, Authenticated, Admin).
pub mod routes;
use auth::SessionToken;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use auth::TokenDecoder;
pub use backend::{BackendApi, BackendState, HttpBackend};
pub use config::AppConfig;

/// ApiDoc
///
/// OpenAPI document for the console API, served at `/api-docs/openapi.json`
/// and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_me, handlers::login, handlers::logout, handlers::forgot_password,
        handlers::verify_reset_otp, handlers::reset_password, handlers::verify_signup_otp,
        handlers::resend_signup_otp, handlers::list_categories, handlers::create_category,
        handlers::update_category, handlers::list_creators, handlers::delete_creator,
        handlers::dashboard_stats, handlers::growth_overview, handlers::get_policy,
        handlers::save_policy
    ),
    components(
        schemas(
            models::AccessClaims, models::ApiResponse, models::LoginRequest,
            models::ForgotPasswordRequest, models::PageQuery, models::PolicyKind,
            models::TokenForm,
        )
    ),
    tags(
        (name = "streamdesk-console", description = "Streamdesk admin console API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Immutable container shared by every request: the platform client, the
/// token decoder used by the gate and `/api/me`, and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendState,
    pub tokens: TokenDecoder,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(backend: BackendState, config: AppConfig) -> Self {
        let tokens = TokenDecoder::from_secret(config.token_secret.as_deref());
        Self {
            backend,
            tokens,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

impl FromRef<AppState> for TokenDecoder {
    fn from_ref(app_state: &AppState) -> TokenDecoder {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Rejects requests without an `accessToken` cookie before they reach a data
/// handler. `SessionToken` does the rejection (401 envelope).
async fn session_middleware(_session: SessionToken, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the console: the `/api` routers, API docs, static assets and the
/// console shell fallback, with the page gate in front of everything.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let asset_dir = PathBuf::from(&state.config.asset_dir);
    let shell = ServeDir::new(&asset_dir).fallback(ServeFile::new(asset_dir.join("index.html")));

    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .merge(admin::admin_routes())
                .route_layer(middleware::from_fn(session_middleware)),
        );

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api)
        .nest_service("/static", ServeDir::new(&asset_dir))
        // Every other path is a console page: SPA shell with index.html fallback.
        .fallback_service(shell)
        // The gate sees every request; it lets API, docs and assets through itself.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::gate_middleware,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the method, URI and `x-request-id`, so every
/// log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
