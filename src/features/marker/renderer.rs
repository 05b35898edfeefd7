use image::{GrayImage, Luma, imageops};

use super::MarkerError;
use super::codebook::{Codebook, codebook};
use super::dictionary::Dictionary;

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// 渲染单个标记（纯函数，相同输入得到逐像素相同的结果）。
///
/// 1. 按字典取出 `id` 对应的码字；
/// 2. 在码字外围加上 `border_bits` 个单元宽的黑色边框，按最近邻采样栅格化为
///    `size × size` 灰度图；
/// 3. `margin > 0` 时四周填充 `margin` 像素白边，最终边长 `size + 2 * margin`。
pub fn render_marker(
    dictionary: Dictionary,
    id: u32,
    size: u32,
    margin: u32,
    border_bits: u32,
) -> Result<GrayImage, MarkerError> {
    if size == 0 {
        return Err(MarkerError::InvalidGeometry("size 必须 >= 1".into()));
    }
    if border_bits == 0 {
        return Err(MarkerError::InvalidGeometry("border_bits 必须 >= 1".into()));
    }
    let side = margin
        .checked_mul(2)
        .and_then(|m| m.checked_add(size))
        .ok_or_else(|| MarkerError::InvalidGeometry("输出尺寸溢出".into()))?;

    let code = codebook(dictionary)
        .code(id)
        .ok_or(MarkerError::InvalidIdentifier {
            id: i64::from(id),
            max: dictionary.max_id(),
        })?;

    let symbol = rasterize(code, dictionary.marker_size(), border_bits as usize, size);
    if margin == 0 {
        return Ok(symbol);
    }

    let mut canvas = GrayImage::from_pixel(side, side, WHITE);
    imageops::replace(&mut canvas, &symbol, i64::from(margin), i64::from(margin));
    Ok(canvas)
}

fn rasterize(code: u64, marker_size: usize, border: usize, size: u32) -> GrayImage {
    let cells = (marker_size + 2 * border) as u64;
    let inner = border..border + marker_size;
    let to_cell = |p: u32| (u64::from(p) * cells / u64::from(size)) as usize;

    GrayImage::from_fn(size, size, |x, y| {
        let (cx, cy) = (to_cell(x), to_cell(y));
        if !inner.contains(&cx) || !inner.contains(&cy) {
            return BLACK;
        }
        if Codebook::is_black(code, marker_size, cx - border, cy - border) {
            BLACK
        } else {
            WHITE
        }
    })
}
