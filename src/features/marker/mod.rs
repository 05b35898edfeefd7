pub mod codebook;
pub mod dictionary;
pub mod encoder;
pub mod handler;
pub mod models;
pub mod renderer;
pub mod service;

use thiserror::Error;

pub use dictionary::{Dictionary, MARKER_COUNT};
pub use encoder::{EncodeError, PngOptions, encode_png, encode_png_base64};
pub use handler::create_marker_router;
pub use models::{
    BatchSpec, FieldViolation, GenerateBatchRequest, GenerateBatchResponse, GenerateRequest,
    GenerateResponse, MarkerImage, MarkerSpec, RenderParams,
};
pub use renderer::render_marker;
pub use service::MarkerService;

/// 标记生成领域错误
#[derive(Error, Debug)]
pub enum MarkerError {
    /// ID 超出字典范围
    #[error("标记 ID {id} 超出字典范围（0-{max}）")]
    InvalidIdentifier { id: i64, max: u32 },

    /// 未知字典
    #[error("字典 '{0}' 不受支持（可选 4x4, 5x5, 6x6, 7x7）")]
    InvalidDictionary(String),

    /// 渲染几何参数非法（经过请求校验后不应出现）
    #[error("渲染参数非法: {0}")]
    InvalidGeometry(String),

    /// 请求参数校验失败（包含全部违规字段）
    #[error("参数校验失败: {}", describe_violations(.0))]
    Invalid(Vec<FieldViolation>),

    /// PNG 编码失败
    #[error("图片编码失败: {0}")]
    Encode(#[from] EncodeError),
}

fn describe_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
