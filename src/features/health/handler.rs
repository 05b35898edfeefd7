use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::features::marker::Dictionary;
use crate::state::AppState;

/// 健康检查响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: &'static str,
    #[schema(example = "aruco-marker-api")]
    pub service: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
    /// 支持的字典
    #[schema(example = json!(["4x4", "5x5", "6x6", "7x7"]))]
    pub dictionaries: Vec<&'static str>,
    /// 当前空闲的渲染许可数
    #[schema(example = 8)]
    pub idle_render_slots: usize,
}

#[utoipa::path(
    get,
    path = "/health",
    summary = "健康检查",
    description = "探活端点：返回服务版本、支持的字典以及空闲渲染许可数。",
    responses((status = 200, description = "服务健康", body = HealthResponse)),
    tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        dictionaries: Dictionary::ALL.iter().map(|d| d.as_str()).collect(),
        idle_render_slots: state.render_semaphore.available_permits(),
    })
}
