use utoipa::OpenApi;
use utoipa::openapi::server::{ServerBuilder, ServerVariableBuilder};
use utoipa::Modify;

/// 为 Swagger UI 提供业务接口前缀的 Servers 配置。
///
/// 业务接口挂载在 `config.api.prefix` 下（默认空，即根路径）；`/health` 始终不带前缀。
struct ApiServers;

impl Modify for ApiServers {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let api = ServerBuilder::new()
            .url("{api_prefix}")
            .description(Some("业务接口（默认挂载在根路径）"))
            .parameter(
                "api_prefix",
                ServerVariableBuilder::new()
                    .default_value("")
                    .description(Some(
                        "业务接口前缀：对应 config.api.prefix（可通过 APP_API__PREFIX 覆盖）",
                    )),
            )
            .build();

        let root = ServerBuilder::new()
            .url("/")
            .description(Some("根路径（用于 /health 等不带前缀接口）"))
            .build();

        openapi.servers = Some(vec![api, root]);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::info::handler::root,
        crate::features::info::handler::get_info,
        crate::features::marker::handler::generate_marker_get,
        crate::features::marker::handler::generate_marker_post,
        crate::features::marker::handler::generate_multiple,
    ),
    components(schemas(
        crate::error::ProblemDetails,
        crate::error::ProblemFieldError,
        crate::features::marker::Dictionary,
    )),
    modifiers(&ApiServers),
    tags(
        (
            name = "Marker",
            description = "标记生成：按 ID 与渲染参数生成单个或一组标记（PNG，base64 编码）。"
        ),
        (name = "Info", description = "服务说明：支持的字典与参数范围。"),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "ArUco Marker API",
        version = env!("CARGO_PKG_VERSION"),
        description = "参数化的方形基准标记生成服务（Axum + utoipa）。"
    )
)]
pub struct ApiDoc;
