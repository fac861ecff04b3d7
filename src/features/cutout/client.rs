use axum::body::Bytes;
use reqwest::multipart::{Form, Part};

use crate::config::SegmentationConfig;
use crate::error::AppError;
use crate::features::upload::{IMAGE_FIELD, UploadedImage};

/// 上游鉴权头
const API_KEY_HEADER: &str = "X-Api-Key";

/// 上游错误响应体写入日志时的最大字符数
const MAX_LOGGED_BODY_CHARS: usize = 512;

/// 上游抠图（背景移除）服务客户端
#[derive(Clone)]
pub struct SegmentationClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SegmentationClient {
    pub fn new(cfg: &SegmentationConfig) -> Result<Self, AppError> {
        let client = crate::http::build_segmentation_client(cfg)
            .map_err(|e| AppError::Internal(format!("初始化 HTTP Client 失败: {e}")))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 把上传的图片原样转发给上游，返回上游生成的图片字节。
    ///
    /// 非 2xx 时读取响应体仅用于日志，返回 [`AppError::Upstream`]。
    pub async fn remove_background(
        &self,
        api_key: &str,
        upload: &UploadedImage,
    ) -> Result<Bytes, AppError> {
        let form = Form::new().part(IMAGE_FIELD, upload_part(upload));

        let resp = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body: truncate_chars(&body, MAX_LOGGED_BODY_CHARS),
            });
        }

        Ok(resp.bytes().await?)
    }
}

/// 构造上传 part：复用请求内的 `Bytes`，不复制文件内容。
fn upload_part(upload: &UploadedImage) -> Part {
    let len = upload.bytes.len() as u64;
    let base = || {
        Part::stream_with_length(reqwest::Body::from(upload.bytes.clone()), len)
            .file_name(upload.filename.clone())
    };
    match upload.content_type.as_deref() {
        // 客户端声明的类型非法时退回为不带类型的 part
        Some(ct) => base().mime_str(ct).unwrap_or_else(|_| base()),
        None => base(),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
