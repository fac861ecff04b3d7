use std::time::Instant;

use axum::{
    Router,
    extract::{Multipart, multipart::MultipartRejection},
    response::Response,
    routing::post,
};

use crate::error::AppError;
use crate::features::upload::read_image_upload;
use crate::imaging::png_response;
use crate::state::AppState;

use super::overlay::mark_corners_png;

#[utoipa::path(
    post,
    path = "/add-corner-pixels",
    summary = "四角标记",
    description = "在上传图片的四个角各写入一个不透明白色像素（RGBA 255,255,255,255），其余像素不变，以 PNG 返回。",
    request_body(content = crate::openapi::ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PNG bytes with corner markers"),
        (status = 400, description = "No image file provided.", body = crate::error::ErrorBody),
        (status = 500, description = "Internal error", body = crate::error::ErrorBody)
    ),
    tag = "Image"
)]
pub async fn add_corner_pixels(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let t_total = Instant::now();
    let upload = read_image_upload(multipart).await?;
    tracing::info!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        "收到四角标记请求"
    );

    let bytes = upload.bytes;
    let png = tokio::task::spawn_blocking(move || mark_corners_png(&bytes)).await??;

    tracing::info!(
        size = png.len(),
        elapsed_ms = t_total.elapsed().as_millis() as u64,
        "四角标记完成"
    );
    Ok(png_response(png))
}

pub fn create_corners_router() -> Router<AppState> {
    Router::new().route("/add-corner-pixels", post(add_corner_pixels))
}
