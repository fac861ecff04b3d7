use std::sync::Arc;

use crate::config::{ApiCredential, SegmentationConfig};
use crate::error::AppError;
use crate::features::cutout::{OutputSize, SegmentationClient};

/// 聚合的应用共享状态（全部只读，请求之间不共享可变数据）
#[derive(Clone)]
pub struct AppState {
    /// 上游凭证（启动时读取一次，可能缺失）
    pub credential: ApiCredential,
    /// 上游抠图服务客户端
    pub segmentation: Arc<SegmentationClient>,
    /// 抠图结果输出尺寸
    pub output_size: OutputSize,
}

impl AppState {
    pub fn new(cfg: &SegmentationConfig, credential: ApiCredential) -> Result<Self, AppError> {
        Ok(Self {
            credential,
            segmentation: Arc::new(SegmentationClient::new(cfg)?),
            output_size: OutputSize::new(cfg.target_width, cfg.target_height),
        })
    }
}
