//! 标记字典变体（4x4 / 5x5 / 6x6 / 7x7）。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MarkerError;

/// 每个字典的码本容量（有效 ID 为 `0..MARKER_COUNT`）。
pub const MARKER_COUNT: u32 = 50;

/// 支持的符号字典。
///
/// 每个变体决定内部比特网格的边长，码本均为 50 个符号。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema, Default,
)]
pub enum Dictionary {
    #[default]
    #[serde(rename = "4x4")]
    Dict4x4,
    #[serde(rename = "5x5")]
    Dict5x5,
    #[serde(rename = "6x6")]
    Dict6x6,
    #[serde(rename = "7x7")]
    Dict7x7,
}

impl Dictionary {
    /// 全部变体，按网格尺寸升序。
    pub const ALL: [Dictionary; 4] = [
        Dictionary::Dict4x4,
        Dictionary::Dict5x5,
        Dictionary::Dict6x6,
        Dictionary::Dict7x7,
    ];

    /// 内部比特网格边长（不含边框）。
    pub fn marker_size(self) -> usize {
        match self {
            Dictionary::Dict4x4 => 4,
            Dictionary::Dict5x5 => 5,
            Dictionary::Dict6x6 => 6,
            Dictionary::Dict7x7 => 7,
        }
    }

    pub fn bit_count(self) -> usize {
        self.marker_size() * self.marker_size()
    }

    /// 最大有效 ID（含）。
    pub fn max_id(self) -> u32 {
        MARKER_COUNT - 1
    }

    pub fn contains_id(self, id: u32) -> bool {
        id < MARKER_COUNT
    }

    /// 对外使用的字符串名称，如 `"4x4"`。
    pub fn as_str(self) -> &'static str {
        match self {
            Dictionary::Dict4x4 => "4x4",
            Dictionary::Dict5x5 => "5x5",
            Dictionary::Dict6x6 => "6x6",
            Dictionary::Dict7x7 => "7x7",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Dictionary::Dict4x4 => 0,
            Dictionary::Dict5x5 => 1,
            Dictionary::Dict6x6 => 2,
            Dictionary::Dict7x7 => 3,
        }
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dictionary {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Dictionary::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| MarkerError::InvalidDictionary(s.to_string()))
    }
}
