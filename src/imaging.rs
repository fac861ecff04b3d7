//! 图片编解码的公共工具
//!
//! 编解码函数都是同步且 CPU 密集的，调用方需放到 `spawn_blocking` 中执行。

use std::io::Cursor;

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::AppError;

/// 输出格式固定为 PNG
pub const OUTPUT_CONTENT_TYPE: &str = "image/png";

/// 只读取图片头部获取尺寸，不解码像素。
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), AppError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Image(format!("识别图片格式失败: {e}")))?;
    Ok(reader.into_dimensions()?)
}

/// 按内容嗅探格式并完整解码
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, AppError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::Image(format!("识别图片格式失败: {e}")))?;
    Ok(reader.decode()?)
}

/// 编码为 PNG。
///
/// PNG 不支持浮点像素，32F 图像先降到 16 位 RGBA。
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let converted;
    let img = match img {
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
            converted = DynamicImage::ImageRgba16(img.to_rgba16());
            &converted
        }
        other => other,
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// 200 + `image/png` 响应
pub fn png_response(png: Vec<u8>) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static(OUTPUT_CONTENT_TYPE))],
        png,
    )
        .into_response()
}
