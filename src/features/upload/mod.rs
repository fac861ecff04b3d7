//! 上传解析：从 multipart 请求中取出唯一的图片文件字段

use axum::body::Bytes;
use axum::extract::{Multipart, multipart::MultipartRejection};

use crate::error::AppError;

/// 上传与转发时使用的文件字段名
pub const IMAGE_FIELD: &str = "image_file";

/// 客户端未提供文件名时使用的占位名
const FALLBACK_FILENAME: &str = "image";

/// 单次请求内的上传图片（整文件驻留内存，随请求结束释放）
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// 原始文件名
    pub filename: String,
    /// 客户端声明的 Content-Type（仅透传，不做校验）
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// 读取 `image_file` 字段。
///
/// 以下情况统一视为“未提供文件”：
/// - 请求不是 multipart/form-data（或 boundary 缺失）
/// - multipart 体无法读取
/// - 没有名为 `image_file`、带 filename 且内容非空的文件字段
///
/// 空文件 part（浏览器未选择文件时会发送）会被跳过；取第一个非空文件，其余忽略。
pub async fn read_image_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedImage, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        tracing::debug!("multipart 解析被拒绝: {}", rejection);
        AppError::MissingFile
    })?;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("读取 multipart 字段失败: {}", e);
                return Err(AppError::MissingFile);
            }
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        // 没有 filename 的同名字段是普通表单值，不是文件
        let Some(raw_name) = field.file_name() else {
            continue;
        };
        let filename = match raw_name.trim() {
            "" => FALLBACK_FILENAME.to_string(),
            name => name.to_string(),
        };
        let content_type = field.content_type().map(str::to_string);

        let bytes = field.bytes().await.map_err(|e| {
            tracing::warn!("读取上传文件内容失败: {}", e);
            AppError::MissingFile
        })?;
        if bytes.is_empty() {
            tracing::debug!(filename = %filename, "跳过空文件字段");
            continue;
        }

        tracing::debug!(filename = %filename, size = bytes.len(), "已接收上传文件");
        return Ok(UploadedImage {
            filename,
            content_type,
            bytes,
        });
    }

    Err(AppError::MissingFile)
}
