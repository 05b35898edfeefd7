use super::MarkerError;
use super::encoder::{PngOptions, encode_png_base64};
use super::models::{BatchSpec, GenerateBatchResponse, GenerateResponse, MarkerImage, MarkerSpec};
use super::renderer::render_marker;

/// 标记生成服务：渲染 + PNG/base64 编码 + 响应组装。
///
/// 不持有任何请求间状态，只携带编码参数，可自由复制到阻塞线程中使用。
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerService {
    png: PngOptions,
}

impl MarkerService {
    pub fn new(png: PngOptions) -> Self {
        Self { png }
    }

    fn render_base64(&self, spec: &MarkerSpec) -> Result<String, MarkerError> {
        let p = spec.params;
        let img = render_marker(p.dictionary, spec.id, p.size, p.margin, p.border_bits)?;
        Ok(encode_png_base64(&img, self.png)?)
    }

    /// 生成单个标记。
    pub fn generate(&self, spec: &MarkerSpec) -> Result<GenerateResponse, MarkerError> {
        let image_base64 = self.render_base64(spec)?;
        Ok(GenerateResponse {
            success: true,
            id: spec.id,
            image_base64,
            size: spec.params.size,
            margin: spec.params.margin,
            dictionary: spec.params.dictionary,
            message: format!("标记 {} 生成成功", spec.id),
        })
    }

    /// 批量生成：按 `start_id..start_id+count` 顺序渲染，超出字典范围的 ID 直接跳过。
    pub fn generate_batch(&self, batch: &BatchSpec) -> Result<GenerateBatchResponse, MarkerError> {
        let mut markers = Vec::with_capacity(batch.count as usize);
        for id in batch.ids() {
            let spec = MarkerSpec {
                id,
                params: batch.params,
            };
            markers.push(MarkerImage {
                id,
                image_base64: self.render_base64(&spec)?,
                size: batch.params.size,
                margin: batch.params.margin,
            });
        }

        let skipped = batch.count as usize - markers.len();
        if skipped > 0 {
            tracing::debug!(
                "批量生成跳过 {} 个超出范围的 ID（start_id={}, count={}）",
                skipped,
                batch.start_id,
                batch.count
            );
        }

        let total_generated = markers.len() as u32;
        Ok(GenerateBatchResponse {
            success: true,
            markers,
            total_generated,
            message: format!("成功生成 {total_generated} 个标记"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::marker::models::GenerateBatchRequest;

    fn batch(start_id: i64, count: i64, dictionary: &str) -> BatchSpec {
        BatchSpec::try_from(&GenerateBatchRequest {
            start_id,
            count,
            size: 60,
            margin: 0,
            border_bits: 1,
            dictionary: dictionary.to_string(),
        })
        .unwrap()
    }

    #[test]
    fn single_generation_echoes_parameters() {
        let spec = MarkerSpec::new(5, 100, 4, 2, "6x6").unwrap();
        let resp = MarkerService::default().generate(&spec).unwrap();
        assert!(resp.success);
        assert_eq!(resp.id, 5);
        assert_eq!(resp.size, 100);
        assert_eq!(resp.margin, 4);
        assert_eq!(resp.dictionary.as_str(), "6x6");
        assert!(!resp.image_base64.is_empty());
    }

    #[test]
    fn identical_specs_encode_identically() {
        let spec = MarkerSpec::new(17, 250, 12, 3, "5x5").unwrap();
        let svc = MarkerService::default();
        assert_eq!(
            svc.generate(&spec).unwrap().image_base64,
            svc.generate(&spec).unwrap().image_base64
        );
    }

    #[test]
    fn batch_skips_out_of_range_tail() {
        let resp = MarkerService::default()
            .generate_batch(&batch(45, 10, "7x7"))
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.total_generated, 5);
        let ids: Vec<u32> = resp.markers.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![45, 46, 47, 48, 49]);
    }

    #[test]
    fn batch_entirely_out_of_range_is_empty_success() {
        let resp = MarkerService::default()
            .generate_batch(&batch(60, 5, "4x4"))
            .unwrap();
        assert!(resp.success);
        assert_eq!(resp.total_generated, 0);
        assert!(resp.markers.is_empty());
    }
}
