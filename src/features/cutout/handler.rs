use std::time::Instant;

use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    response::Response,
    routing::post,
};

use crate::error::AppError;
use crate::features::upload::read_image_upload;
use crate::imaging::png_response;
use crate::state::AppState;

use super::resize::resize_to_png;

#[utoipa::path(
    post,
    path = "/process-image",
    summary = "移除背景并缩放",
    description = "把上传的图片转发给上游抠图服务，结果直接拉伸到 1200x1300（不保持宽高比）后以 PNG 返回。",
    request_body(content = crate::openapi::ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "PNG bytes (1200x1300)"),
        (status = 400, description = "No image file provided.", body = crate::error::ErrorBody),
        (status = 500, description = "Missing API key or internal error", body = crate::error::ErrorBody)
    ),
    tag = "Image"
)]
pub async fn process_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let t_total = Instant::now();
    tracing::info!("收到抠图请求");

    // 先校验凭证，再解析上传；两者任一失败都不会访问上游
    let api_key = state
        .credential
        .expose()
        .ok_or(AppError::MissingApiKey)?;
    let upload = read_image_upload(multipart).await?;

    tracing::info!(
        filename = %upload.filename,
        size = upload.bytes.len(),
        endpoint = state.segmentation.endpoint(),
        "转发至上游抠图服务"
    );
    let t_upstream = Instant::now();
    let cutout = state.segmentation.remove_background(api_key, &upload).await?;
    tracing::info!(
        size = cutout.len(),
        elapsed_ms = t_upstream.elapsed().as_millis() as u64,
        "上游返回抠图结果"
    );

    // 解码/缩放/编码是 CPU 密集任务，移出 tokio worker
    let size = state.output_size;
    let png = tokio::task::spawn_blocking(move || resize_to_png(&cutout, size)).await??;

    tracing::info!(
        size = png.len(),
        elapsed_ms = t_total.elapsed().as_millis() as u64,
        "抠图请求完成"
    );
    Ok(png_response(png))
}

pub fn create_cutout_router() -> Router<AppState> {
    Router::new().route("/process-image", post(process_image))
}
