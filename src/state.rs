use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::MarkerConfig;
use crate::features::marker::{MarkerService, PngOptions};

/// 聚合的应用共享状态（只读，不保存任何请求间数据）
#[derive(Clone)]
pub struct AppState {
    pub marker_service: MarkerService,
    /// 控制并发渲染的信号量（限制 CPU 密集型任务数量）
    pub render_semaphore: Arc<Semaphore>,
}

impl AppState {
    pub fn new(marker: &MarkerConfig) -> Self {
        let permits = match marker.max_parallel as usize {
            0 => num_cpus::get(),
            m => m,
        };
        Self {
            marker_service: MarkerService::new(PngOptions {
                fast: marker.fast_png,
            }),
            render_semaphore: Arc::new(Semaphore::new(permits.max(1))),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&MarkerConfig::default())
    }
}
