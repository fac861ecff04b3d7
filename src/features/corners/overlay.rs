use image::{DynamicImage, ImageBuffer, Pixel, Rgba};

use crate::error::AppError;
use crate::imaging;

/// 不透明白色
pub const MARKER_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 单像素覆盖的锚点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// 锚点在 `width x height` 画布上的像素坐标（画布非空）。
    ///
    /// 宽或高为 1 时不同锚点会落在同一像素上。
    pub fn position(self, width: u32, height: u32) -> (u32, u32) {
        let right = width.saturating_sub(1);
        let bottom = height.saturating_sub(1);
        match self {
            Anchor::TopLeft => (0, 0),
            Anchor::TopRight => (right, 0),
            Anchor::BottomLeft => (0, bottom),
            Anchor::BottomRight => (right, bottom),
        }
    }
}

/// 在锚点处写入一个 1x1 像素
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelOverlay {
    pub anchor: Anchor,
    pub color: Rgba<u8>,
}

/// 四角白色标记
pub fn corner_markers() -> [PixelOverlay; 4] {
    [
        Anchor::TopLeft,
        Anchor::TopRight,
        Anchor::BottomLeft,
        Anchor::BottomRight,
    ]
    .map(|anchor| PixelOverlay {
        anchor,
        color: MARKER_COLOR,
    })
}

/// 按顺序写入覆盖像素，重叠时后写入者生效。
pub fn apply_overlays<P, F>(
    canvas: &mut ImageBuffer<P, Vec<P::Subpixel>>,
    overlays: &[PixelOverlay],
    to_pixel: F,
) where
    P: Pixel,
    F: Fn(Rgba<u8>) -> P,
{
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    for overlay in overlays {
        let (x, y) = overlay.anchor.position(w, h);
        canvas.put_pixel(x, y, to_pixel(overlay.color));
    }
}

/// 把覆盖像素合成到整张图上。
///
/// 覆盖像素完全不透明，直接替换目标像素；8 位图像统一转为 RGBA8，
/// 高位深图像转为 RGBA16 以保证其余像素无损。
pub fn composite(img: DynamicImage, overlays: &[PixelOverlay]) -> DynamicImage {
    let color = img.color();
    if color.bytes_per_pixel() > color.channel_count() {
        let mut canvas = img.into_rgba16();
        apply_overlays(&mut canvas, overlays, |c| {
            Rgba(c.0.map(|v| u16::from(v) * 257))
        });
        DynamicImage::ImageRgba16(canvas)
    } else {
        let mut canvas = img.into_rgba8();
        apply_overlays(&mut canvas, overlays, |c| c);
        DynamicImage::ImageRgba8(canvas)
    }
}

/// 读取尺寸、合成四角标记并编码为 PNG
pub fn mark_corners_png(bytes: &[u8]) -> Result<Vec<u8>, AppError> {
    let (width, height) = imaging::probe_dimensions(bytes)?;
    tracing::debug!(width, height, "读取图片尺寸");
    if width == 0 || height == 0 {
        return Err(AppError::Image(format!("空图片: {width}x{height}")));
    }

    let img = imaging::decode(bytes)?;
    let marked = composite(img, &corner_markers());
    imaging::encode_png(&marked)
}
