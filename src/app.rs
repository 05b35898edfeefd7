use axum::{Router, http::Uri, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::error::AppError;
use crate::features::{health, info, marker};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 响应压缩策略：只压缩 1KiB 以上的非图片、非 SSE 响应。
fn compression_predicate() -> impl Predicate {
    SizeAbove::new(1024)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE)
}

async fn route_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("路径 {} 不存在", uri.path()))
}

/// 组装完整的 HTTP 应用（路由 + 文档 + 中间件）。
pub fn build_app(config: &AppConfig, state: AppState) -> Router {
    let api_router = Router::<AppState>::new()
        .merge(info::create_info_router())
        .merge(marker::create_marker_router());

    let mut app = Router::<AppState>::new().route("/health", get(health::health_check));
    app = match config.api_prefix() {
        Some(prefix) => app.nest(&prefix, api_router),
        None => app.merge(api_router),
    };

    let mut app = app
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .with_state(state)
        .layer(CompressionLayer::new().compress_when(compression_predicate()));

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    // request_id 位于最外层，保证 CORS/兜底路由产生的错误同样带 requestId
    app.layer(axum::middleware::from_fn(request_id_middleware))
}
