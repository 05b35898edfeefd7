use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::features::marker::{FieldViolation, MarkerError};

/// 应用统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 请求体 / 查询串无法解析
    #[error("请求格式错误: {0}")]
    BadRequest(String),

    /// 参数校验错误（字段级）
    #[error("参数校验错误: {}", join_messages(.0))]
    InvalidParams(Vec<FieldViolation>),

    /// 路由不存在
    #[error("未找到: {0}")]
    NotFound(String),

    /// 标记渲染 / 编码失败
    #[error("标记渲染错误: {0}")]
    Render(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

fn join_messages(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// RFC7807 风格的错误响应（Problem Details）。
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// 问题类型（URI）。若无更细分的类型，可使用 about:blank。
    #[serde(rename = "type")]
    #[schema(example = "about:blank")]
    pub type_url: String,

    #[schema(example = "Validation Failed")]
    pub title: String,

    #[schema(example = 422)]
    pub status: u16,

    /// 人类可读的详细信息（服务端错误仅返回简短描述）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// 稳定的错误码，用于程序化处理。
    #[schema(example = "VALIDATION_FAILED")]
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// 字段级校验错误
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ProblemFieldError>>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFieldError {
    /// 字段名（与请求字段一致）
    #[schema(example = "size")]
    pub field: String,
    pub message: String,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidParams(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Render(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn stable_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidParams(_) => "VALIDATION_FAILED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Render(_) => "IMAGE_RENDER_FAILED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn title(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::UNPROCESSABLE_ENTITY => "Validation Failed",
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error",
            _ => "Error",
        }
    }

    /// 对外暴露的详情：服务端错误只给出简短描述，原因仅写入日志。
    fn public_detail(&self) -> String {
        match self {
            AppError::Render(cause) => {
                tracing::error!("标记渲染失败: {}", cause);
                "标记渲染失败".to_string()
            }
            AppError::Internal(cause) => {
                tracing::error!("内部错误: {}", cause);
                "服务器内部错误".to_string()
            }
            other => {
                tracing::debug!("客户端请求错误: {}", other);
                other.to_string()
            }
        }
    }
}

impl From<MarkerError> for AppError {
    fn from(err: MarkerError) -> Self {
        match err {
            MarkerError::Invalid(violations) => AppError::InvalidParams(violations),
            MarkerError::InvalidIdentifier { .. } => AppError::InvalidParams(vec![FieldViolation {
                field: "id",
                message: err.to_string(),
            }]),
            MarkerError::InvalidDictionary(_) => AppError::InvalidParams(vec![FieldViolation {
                field: "dictionary",
                message: err.to_string(),
            }]),
            MarkerError::InvalidGeometry(_) | MarkerError::Encode(_) => {
                AppError::Render(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = Some(self.public_detail());

        let problem = ProblemDetails {
            type_url: "about:blank".to_string(),
            title: self.title().to_string(),
            status: status.as_u16(),
            detail,
            code: self.stable_code().to_string(),
            request_id: crate::request_id::current_request_id(),
            errors: match self {
                AppError::InvalidParams(violations) => Some(
                    violations
                        .into_iter()
                        .map(|v| ProblemFieldError {
                            field: v.field.to_string(),
                            message: v.message,
                        })
                        .collect(),
                ),
                _ => None,
            },
        };

        let mut res = Json(problem).into_response();
        *res.status_mut() = status;
        res.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_errors_map_to_client_or_server_status() {
        let invalid: AppError = MarkerError::InvalidDictionary("9x9".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let id: AppError = MarkerError::InvalidIdentifier { id: 50, max: 49 }.into();
        assert!(matches!(&id, AppError::InvalidParams(v) if v[0].field == "id"));

        let geometry: AppError = MarkerError::InvalidGeometry("size 必须 >= 1".into()).into();
        assert_eq!(geometry.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(geometry.stable_code(), "IMAGE_RENDER_FAILED");
    }

    #[test]
    fn render_error_detail_hides_cause() {
        let err = AppError::Render("PNG finish error: io".into());
        assert_eq!(err.public_detail(), "标记渲染失败");
    }
}
