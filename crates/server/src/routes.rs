use std::path::PathBuf;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::errors::ApiError;
use crate::metrics;
use crate::openapi::ApiDoc;

pub mod auth;
pub mod listings;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn render_metrics(State(state): State<ServerState>) -> (StatusCode, String) {
    state.metrics.render()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Wrong method on a known path: same envelope as every other failure.
async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

/// Build the full application router. `static_dir`, when given, answers
/// every path no route claims.
pub fn build_router(state: ServerState, cors: CorsLayer, static_dir: Option<PathBuf>) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    let api = Router::new()
        .route("/api/auth/login", post(auth::login).fallback(method_not_allowed))
        .route("/api/auth/signup", post(auth::signup).fallback(method_not_allowed))
        .route("/api/auth/logout", post(auth::logout).fallback(method_not_allowed))
        .route("/api/auth/me", get(auth::me).fallback(method_not_allowed))
        .route("/api/profile", get(auth::profile).fallback(method_not_allowed))
        .route("/api/listings", post(listings::create_listing).fallback(method_not_allowed));

    let mut app = public.merge(api);
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn_with_state(state.metrics.clone(), metrics::track))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
