use base64::{Engine as _, engine::general_purpose::STANDARD as base64_engine};
use image::GrayImage;
use thiserror::Error;

/// PNG 编码错误
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("PNG write_header error: {0}")]
    Header(png::EncodingError),
    #[error("PNG write_image_data error: {0}")]
    Data(png::EncodingError),
    #[error("PNG finish error: {0}")]
    Finish(png::EncodingError),
}

/// PNG 编码参数
#[derive(Debug, Clone, Copy, Default)]
pub struct PngOptions {
    /// 优先速度（Fast + NoFilter），体积略大
    pub fast: bool,
}

/// 将 8 位灰度图编码为 PNG 字节流。
pub fn encode_png(img: &GrayImage, opts: PngOptions) -> Result<Vec<u8>, EncodeError> {
    let (w, h) = img.dimensions();
    let mut out = Vec::with_capacity((w as usize * h as usize) / 4);
    {
        let mut encoder = png::Encoder::new(&mut out, w, h);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        if opts.fast {
            encoder.set_compression(png::Compression::Fast);
            encoder.set_filter(png::FilterType::NoFilter);
        } else {
            encoder.set_compression(png::Compression::Default);
            encoder.set_filter(png::FilterType::Paeth);
        }
        let mut writer = encoder.write_header().map_err(EncodeError::Header)?;
        writer
            .write_image_data(img.as_raw())
            .map_err(EncodeError::Data)?;
        writer.finish().map_err(EncodeError::Finish)?;
    }
    Ok(out)
}

/// PNG 编码后再转为标准 base64 文本，便于嵌入 JSON。
pub fn encode_png_base64(img: &GrayImage, opts: PngOptions) -> Result<String, EncodeError> {
    encode_png(img, opts).map(|bytes| base64_engine.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn produces_png_signature_in_both_modes() {
        let img = GrayImage::from_pixel(13, 7, Luma([255]));
        for fast in [false, true] {
            let bytes = encode_png(&img, PngOptions { fast }).unwrap();
            assert_eq!(&bytes[..8], &PNG_SIGNATURE);
        }
    }

    #[test]
    fn decodes_back_to_same_pixels() {
        let img = GrayImage::from_fn(32, 16, |x, y| Luma([if (x + y) % 2 == 0 { 0 } else { 255 }]));
        let bytes = encode_png(&img, PngOptions::default()).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
            .unwrap()
            .to_luma8();
        assert_eq!(decoded.dimensions(), (32, 16));
        assert_eq!(decoded.as_raw(), img.as_raw());
    }

    #[test]
    fn base64_is_standard_alphabet() {
        let img = GrayImage::from_pixel(4, 4, Luma([0]));
        let b64 = encode_png_base64(&img, PngOptions::default()).unwrap();
        let raw = base64_engine.decode(b64.as_bytes()).unwrap();
        assert_eq!(&raw[..8], &PNG_SIGNATURE);
    }
}
