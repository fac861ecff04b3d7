/// 四角像素标记
pub mod corners;
/// 上游抠图 + 缩放
pub mod cutout;
/// 健康检查
pub mod health;
/// multipart 上传解析
pub mod upload;
