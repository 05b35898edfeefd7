use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};

use super::MarkerError;
use super::models::{
    BatchSpec, GenerateBatchRequest, GenerateBatchResponse, GenerateRequest, GenerateResponse,
    MarkerSpec,
};
use crate::error::AppError;
use crate::state::AppState;

/// 在阻塞线程池中执行渲染任务，并受渲染信号量约束。
async fn run_render<T, F>(state: &AppState, job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, MarkerError> + Send + 'static,
    T: Send + 'static,
{
    let permit = state
        .render_semaphore
        .clone()
        .acquire_owned()
        .await
        .map_err(|e| AppError::Internal(format!("获取渲染信号量失败: {e}")))?;

    // 许可随渲染任务一起释放：请求被取消时阻塞任务仍在运行，仍需占用并发额度
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        job()
    })
    .await
        .map_err(|e| AppError::Internal(format!("阻塞渲染任务执行失败: {e}")))?
        .map_err(AppError::from)
}

async fn generate_one(
    state: AppState,
    req: GenerateRequest,
) -> Result<Json<GenerateResponse>, AppError> {
    let spec = MarkerSpec::try_from(&req)?;
    let t0 = Instant::now();
    let svc = state.marker_service;
    let resp = run_render(&state, move || svc.generate(&spec)).await?;
    tracing::info!(
        target: "marker_generate",
        "生成标记: id={}, dictionary={}, size={}, margin={}, border_bits={}, 耗时={}ms",
        spec.id,
        spec.params.dictionary,
        spec.params.size,
        spec.params.margin,
        spec.params.border_bits,
        t0.elapsed().as_millis()
    );
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/generate",
    summary = "生成单个标记（查询参数）",
    description = "按 ID 与渲染参数生成标记，返回 base64 编码的 PNG。",
    params(GenerateRequest),
    responses(
        (status = 200, description = "生成成功", body = GenerateResponse),
        (
            status = 400,
            description = "查询参数格式错误（缺少 id 等）",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 422,
            description = "参数越界或字典不受支持",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 500,
            description = "渲染失败",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Marker"
)]
pub async fn generate_marker_get(
    State(state): State<AppState>,
    query: Result<Query<GenerateRequest>, QueryRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Query(req) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    generate_one(state, req).await
}

#[utoipa::path(
    post,
    path = "/generate",
    summary = "生成单个标记",
    description = "按 ID 与渲染参数生成标记，返回 base64 编码的 PNG。",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "生成成功", body = GenerateResponse),
        (
            status = 400,
            description = "请求体格式错误",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 422,
            description = "参数越界或字典不受支持",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 500,
            description = "渲染失败",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Marker"
)]
pub async fn generate_marker_post(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    generate_one(state, req).await
}

#[utoipa::path(
    post,
    path = "/generate-multiple",
    summary = "批量生成标记",
    description = "从 start_id 起连续生成 count 个标记；超出字典范围（>49）的 ID 会被跳过，不视为错误。",
    request_body = GenerateBatchRequest,
    responses(
        (status = 200, description = "生成成功（total_generated 为实际数量）", body = GenerateBatchResponse),
        (
            status = 400,
            description = "请求体格式错误",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 422,
            description = "参数越界或字典不受支持",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        ),
        (
            status = 500,
            description = "渲染失败",
            body = crate::error::ProblemDetails,
            content_type = "application/problem+json"
        )
    ),
    tag = "Marker"
)]
pub async fn generate_multiple(
    State(state): State<AppState>,
    body: Result<Json<GenerateBatchRequest>, JsonRejection>,
) -> Result<Json<GenerateBatchResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let batch = BatchSpec::try_from(&req)?;

    let t0 = Instant::now();
    let svc = state.marker_service;
    let resp = run_render(&state, move || svc.generate_batch(&batch)).await?;
    tracing::info!(
        target: "marker_generate",
        "批量生成标记: start_id={}, count={}, generated={}, dictionary={}, 耗时={}ms",
        batch.start_id,
        batch.count,
        resp.total_generated,
        batch.params.dictionary,
        t0.elapsed().as_millis()
    );
    Ok(Json(resp))
}

pub fn create_marker_router() -> Router<AppState> {
    Router::new()
        .route("/generate", get(generate_marker_get).post(generate_marker_post))
        .route("/generate-multiple", post(generate_multiple))
}
