use std::collections::BTreeMap;

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::features::marker::Dictionary;
use crate::features::marker::codebook::codebook;
use crate::features::marker::models::{
    BORDER_BITS_MAX, BORDER_BITS_MIN, COUNT_MAX, COUNT_MIN, MARGIN_MAX, MARGIN_MIN, SIZE_MAX,
    SIZE_MIN,
};
use crate::state::AppState;

/// 根路径响应：服务概览与入口列表
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RootResponse {
    #[schema(example = "ArUco 标记生成 API")]
    pub message: String,
    pub version: String,
    #[schema(example = "/docs")]
    pub docs: String,
    /// 入口名称 → 路径
    pub endpoints: BTreeMap<String, String>,
}

/// 单个字典的说明
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DictionaryInfo {
    pub description: String,
    #[schema(example = 49)]
    pub max_id: u32,
    /// 码字间（含旋转）的最小汉明距离
    #[schema(example = 4)]
    pub min_distance: u32,
    pub recommended_use: String,
}

/// 参数取值范围说明
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ParameterRanges {
    pub id: String,
    pub size: String,
    pub margin: String,
    pub border_bits: String,
    pub count: String,
}

/// `/info` 响应
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct InfoResponse {
    /// 字典名称（如 "4x4"）→ 说明
    pub dictionaries: BTreeMap<String, DictionaryInfo>,
    pub parameters: ParameterRanges,
}

fn dictionary_info(dict: Dictionary) -> DictionaryInfo {
    let (description, recommended_use) = match dict {
        Dictionary::Dict4x4 => ("检测最快，精度较低", "实时检测"),
        Dictionary::Dict5x5 => ("精度更高，检测速度中等", "通用场景"),
        Dictionary::Dict6x6 => ("高精度，检测较慢", "高精度应用"),
        Dictionary::Dict7x7 => ("最高精度，检测最慢", "关键应用"),
    };
    DictionaryInfo {
        description: description.to_string(),
        max_id: dict.max_id(),
        min_distance: codebook(dict).min_distance(),
        recommended_use: recommended_use.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/",
    summary = "服务概览",
    description = "返回服务名称、版本、文档地址与主要入口。",
    responses((status = 200, description = "服务概览", body = RootResponse)),
    tag = "Info"
)]
pub async fn root() -> Json<RootResponse> {
    let endpoints = [
        ("generate_single", "/generate"),
        ("generate_multiple", "/generate-multiple"),
        ("info", "/info"),
        ("health", "/health"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(RootResponse {
        message: "ArUco 标记生成 API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
        endpoints,
    })
}

#[utoipa::path(
    get,
    path = "/info",
    summary = "字典与参数说明",
    description = "列出支持的字典（含最大 ID 与最小汉明距离）以及各参数的取值范围。",
    responses((status = 200, description = "说明信息", body = InfoResponse)),
    tag = "Info"
)]
pub async fn get_info() -> Json<InfoResponse> {
    let dictionaries = Dictionary::ALL
        .into_iter()
        .map(|d| (d.as_str().to_string(), dictionary_info(d)))
        .collect();

    let max_id = Dictionary::default().max_id();
    Json(InfoResponse {
        dictionaries,
        parameters: ParameterRanges {
            id: format!("0-{max_id}（所有字典）"),
            size: format!("{SIZE_MIN}-{SIZE_MAX} 像素"),
            margin: format!("{MARGIN_MIN}-{MARGIN_MAX} 像素"),
            border_bits: format!("{BORDER_BITS_MIN}-{BORDER_BITS_MAX} 单元"),
            count: format!("{COUNT_MIN}-{COUNT_MAX}（批量）"),
        },
    })
}

pub fn create_info_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/info", get(get_info))
}
