use reqwest::Client;

use crate::config::SegmentationConfig;

/// 构建访问上游抠图服务的 HTTP Client。
///
/// 说明：
/// - `Client` 内部带连接池，进程内构建一次后随 `AppState` 共享。
/// - timeout 覆盖连接、发送与读取响应体的全过程。
pub fn build_segmentation_client(cfg: &SegmentationConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(cfg.timeout_duration())
        .user_agent(concat!("cutout-relay/", env!("CARGO_PKG_VERSION")))
        .build()
}
