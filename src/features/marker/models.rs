use serde::{Deserialize, Serialize};

use super::MarkerError;
use super::dictionary::{Dictionary, MARKER_COUNT};

pub const SIZE_MIN: i64 = 50;
pub const SIZE_MAX: i64 = 1000;
pub const MARGIN_MIN: i64 = 0;
pub const MARGIN_MAX: i64 = 100;
pub const BORDER_BITS_MIN: i64 = 1;
pub const BORDER_BITS_MAX: i64 = 4;
pub const COUNT_MIN: i64 = 1;
pub const COUNT_MAX: i64 = 20;

pub const DEFAULT_SIZE: i64 = 200;
pub const DEFAULT_MARGIN: i64 = 10;
pub const DEFAULT_BORDER_BITS: i64 = 1;
pub const DEFAULT_COUNT: i64 = 5;
pub const DEFAULT_DICTIONARY: &str = "4x4";

fn default_size() -> i64 {
    DEFAULT_SIZE
}
fn default_margin() -> i64 {
    DEFAULT_MARGIN
}
fn default_border_bits() -> i64 {
    DEFAULT_BORDER_BITS
}
fn default_count() -> i64 {
    DEFAULT_COUNT
}
fn default_dictionary() -> String {
    DEFAULT_DICTIONARY.to_string()
}

/// 字段级校验失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    fn out_of_range(field: &'static str, value: i64, min: i64, max: i64) -> Self {
        Self {
            field,
            message: format!("{field} 必须在 {min}-{max} 之间（收到 {value}）"),
        }
    }
}

/// 单个标记生成请求（GET 查询参数与 POST JSON 共用）。
///
/// 数值字段先按 `i64` 接收，再由 [`MarkerSpec::try_from`] 做范围校验，
/// 这样越界值会得到字段级的错误说明而不是反序列化失败。
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateRequest {
    /// 标记 ID（0-49），也接受 `marker_id`
    #[serde(alias = "marker_id")]
    #[schema(example = 7)]
    pub id: i64,
    /// 标记边长（像素，50-1000，默认 200）
    #[serde(default = "default_size")]
    #[schema(example = 200)]
    pub size: i64,
    /// 四周白边（像素，0-100，默认 10），也接受 `margin_size`
    #[serde(default = "default_margin", alias = "margin_size")]
    #[schema(example = 10)]
    pub margin: i64,
    /// 边框宽度（单元数，1-4，默认 1）
    #[serde(default = "default_border_bits")]
    #[schema(example = 1)]
    pub border_bits: i64,
    /// 字典：4x4 / 5x5 / 6x6 / 7x7（默认 4x4）
    #[serde(default = "default_dictionary")]
    #[schema(example = "4x4")]
    pub dictionary: String,
}

/// 批量生成请求
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenerateBatchRequest {
    /// 起始 ID（默认 0）；超出字典范围的 ID 会被跳过
    #[serde(default)]
    #[schema(example = 0)]
    pub start_id: i64,
    /// 数量（1-20，默认 5）
    #[serde(default = "default_count")]
    #[schema(example = 5)]
    pub count: i64,
    #[serde(default = "default_size")]
    #[schema(example = 200)]
    pub size: i64,
    #[serde(default = "default_margin", alias = "margin_size")]
    #[schema(example = 10)]
    pub margin: i64,
    #[serde(default = "default_border_bits")]
    #[schema(example = 1)]
    pub border_bits: i64,
    #[serde(default = "default_dictionary")]
    #[schema(example = "4x4")]
    pub dictionary: String,
}

/// 与 ID 无关的渲染参数（已校验）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderParams {
    pub size: u32,
    pub margin: u32,
    pub border_bits: u32,
    pub dictionary: Dictionary,
}

impl RenderParams {
    /// 校验渲染参数；所有违规字段一并返回。
    fn validate(
        size: i64,
        margin: i64,
        border_bits: i64,
        dictionary: &str,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<Self> {
        let size = check_range("size", size, SIZE_MIN, SIZE_MAX, violations);
        let margin = check_range("margin", margin, MARGIN_MIN, MARGIN_MAX, violations);
        let border_bits = check_range(
            "border_bits",
            border_bits,
            BORDER_BITS_MIN,
            BORDER_BITS_MAX,
            violations,
        );
        let dictionary = match dictionary.parse::<Dictionary>() {
            Ok(d) => Some(d),
            Err(e) => {
                violations.push(FieldViolation {
                    field: "dictionary",
                    message: e.to_string(),
                });
                None
            }
        };

        Some(Self {
            size: size?,
            margin: margin?,
            border_bits: border_bits?,
            dictionary: dictionary?,
        })
    }

    pub fn side(&self) -> u32 {
        self.size + 2 * self.margin
    }
}

fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
    violations: &mut Vec<FieldViolation>,
) -> Option<u32> {
    if (min..=max).contains(&value) {
        u32::try_from(value).ok()
    } else {
        violations.push(FieldViolation::out_of_range(field, value, min, max));
        None
    }
}

/// 已校验的单个标记规格。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpec {
    pub id: u32,
    pub params: RenderParams,
}

impl MarkerSpec {
    pub fn new(
        id: i64,
        size: i64,
        margin: i64,
        border_bits: i64,
        dictionary: &str,
    ) -> Result<Self, MarkerError> {
        let mut violations = Vec::new();
        let id = check_range("id", id, 0, i64::from(MARKER_COUNT) - 1, &mut violations);
        let params = RenderParams::validate(size, margin, border_bits, dictionary, &mut violations);
        match (id, params) {
            (Some(id), Some(params)) if violations.is_empty() => Ok(Self { id, params }),
            _ => Err(MarkerError::Invalid(violations)),
        }
    }
}

impl TryFrom<&GenerateRequest> for MarkerSpec {
    type Error = MarkerError;

    fn try_from(req: &GenerateRequest) -> Result<Self, Self::Error> {
        MarkerSpec::new(
            req.id,
            req.size,
            req.margin,
            req.border_bits,
            &req.dictionary,
        )
    }
}

/// 已校验的批量规格：起始 ID 允许越界（越界部分在生成时跳过）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSpec {
    pub start_id: u32,
    pub count: u32,
    pub params: RenderParams,
}

impl BatchSpec {
    /// 实际会生成的 ID（已剔除超出字典范围的尾部）。
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        let dictionary = self.params.dictionary;
        (0..self.count)
            .filter_map(move |i| self.start_id.checked_add(i))
            .filter(move |id| dictionary.contains_id(*id))
    }
}

impl TryFrom<&GenerateBatchRequest> for BatchSpec {
    type Error = MarkerError;

    fn try_from(req: &GenerateBatchRequest) -> Result<Self, Self::Error> {
        let mut violations = Vec::new();
        let start_id = if req.start_id < 0 {
            violations.push(FieldViolation {
                field: "start_id",
                message: format!("start_id 必须 >= 0（收到 {}）", req.start_id),
            });
            None
        } else {
            Some(u32::try_from(req.start_id).unwrap_or(u32::MAX))
        };
        let count = check_range("count", req.count, COUNT_MIN, COUNT_MAX, &mut violations);
        let params = RenderParams::validate(
            req.size,
            req.margin,
            req.border_bits,
            &req.dictionary,
            &mut violations,
        );
        match (start_id, count, params) {
            (Some(start_id), Some(count), Some(params)) if violations.is_empty() => Ok(Self {
                start_id,
                count,
                params,
            }),
            _ => Err(MarkerError::Invalid(violations)),
        }
    }
}

/// 单个标记生成响应
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenerateResponse {
    pub success: bool,
    pub id: u32,
    /// PNG 图片的 base64 文本
    pub image_base64: String,
    pub size: u32,
    pub margin: u32,
    #[schema(value_type = String, example = "4x4")]
    pub dictionary: Dictionary,
    pub message: String,
}

/// 批量结果中的单个标记
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MarkerImage {
    pub id: u32,
    pub image_base64: String,
    pub size: u32,
    pub margin: u32,
}

/// 批量生成响应
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct GenerateBatchResponse {
    pub success: bool,
    pub markers: Vec<MarkerImage>,
    /// 实际生成的数量（尾部越界 ID 不计入）
    pub total_generated: u32,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(start_id: i64, count: i64) -> GenerateBatchRequest {
        GenerateBatchRequest {
            start_id,
            count,
            size: DEFAULT_SIZE,
            margin: DEFAULT_MARGIN,
            border_bits: DEFAULT_BORDER_BITS,
            dictionary: default_dictionary(),
        }
    }

    #[test]
    fn defaults_apply_when_fields_missing() {
        let req: GenerateRequest = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        let spec = MarkerSpec::try_from(&req).unwrap();
        assert_eq!(spec.id, 3);
        assert_eq!(spec.params.size, 200);
        assert_eq!(spec.params.margin, 10);
        assert_eq!(spec.params.border_bits, 1);
        assert_eq!(spec.params.dictionary, Dictionary::Dict4x4);
        assert_eq!(spec.params.side(), 220);
    }

    #[test]
    fn aliases_are_accepted() {
        let req: GenerateRequest =
            serde_json::from_str(r#"{"marker_id": 9, "margin_size": 0, "dictionary": "5x5"}"#)
                .unwrap();
        let spec = MarkerSpec::try_from(&req).unwrap();
        assert_eq!(spec.id, 9);
        assert_eq!(spec.params.margin, 0);
        assert_eq!(spec.params.dictionary, Dictionary::Dict5x5);
    }

    #[test]
    fn collects_every_violated_field() {
        let err = MarkerSpec::new(50, 49, 101, 5, "9x9").unwrap_err();
        let MarkerError::Invalid(violations) = err else {
            panic!("expected Invalid, got {err:?}");
        };
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, ["id", "size", "margin", "border_bits", "dictionary"]);
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(MarkerSpec::new(0, 50, 0, 1, "4x4").is_ok());
        assert!(MarkerSpec::new(49, 1000, 100, 4, "7x7").is_ok());
        assert!(MarkerSpec::new(-1, 200, 10, 1, "4x4").is_err());
    }

    #[test]
    fn batch_tail_is_clamped_to_dictionary() {
        let spec = BatchSpec::try_from(&batch(45, 10)).unwrap();
        assert_eq!(spec.ids().collect::<Vec<_>>(), vec![45, 46, 47, 48, 49]);
    }

    #[test]
    fn batch_starting_out_of_range_yields_nothing() {
        let spec = BatchSpec::try_from(&batch(60, 5)).unwrap();
        assert_eq!(spec.ids().count(), 0);
    }

    #[test]
    fn batch_count_is_bounded() {
        assert!(BatchSpec::try_from(&batch(0, 0)).is_err());
        assert!(BatchSpec::try_from(&batch(0, 21)).is_err());
        assert!(BatchSpec::try_from(&batch(-1, 5)).is_err());
        assert_eq!(BatchSpec::try_from(&batch(0, 20)).unwrap().ids().count(), 20);
    }
}
