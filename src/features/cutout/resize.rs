use image::imageops::FilterType;

use crate::error::AppError;
use crate::imaging;

/// 抠图结果的输出尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSize {
    pub width: u32,
    pub height: u32,
}

impl OutputSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// 解码上游结果并直接拉伸到目标尺寸（不保持宽高比、不裁剪），编码为 PNG。
pub fn resize_to_png(bytes: &[u8], size: OutputSize) -> Result<Vec<u8>, AppError> {
    if size.width == 0 || size.height == 0 {
        return Err(AppError::Internal(format!(
            "无效的输出尺寸 {}x{}",
            size.width, size.height
        )));
    }

    let img = imaging::decode(bytes)?;
    let resized = img.resize_exact(size.width, size.height, FilterType::Lanczos3);
    imaging::encode_png(&resized)
}
