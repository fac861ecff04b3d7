use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// 凭证缺失时返回给客户端的固定文案
pub const MISSING_API_KEY_MESSAGE: &str = "Server configuration error: API key is missing.";
/// 未上传图片时返回给客户端的固定文案
pub const MISSING_FILE_MESSAGE: &str = "No image file provided.";
/// 其余所有内部失败统一使用的文案（不透传上游/内部细节）
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred.";

/// 应用统一错误类型
///
/// `Display` 只用于服务端日志；客户端只能看到 [`AppError::public_message`]。
#[derive(Error, Debug)]
pub enum AppError {
    /// 未配置上游 API Key
    #[error("未配置上游 API Key（环境变量 {}）", crate::config::API_KEY_ENV)]
    MissingApiKey,

    /// 请求中没有 image_file 文件字段
    #[error("请求中缺少图片文件")]
    MissingFile,

    /// 上游返回非成功状态
    #[error("上游返回错误状态 {status}: {body}")]
    Upstream { status: u16, body: String },

    /// 网络请求错误
    #[error("网络错误: {0}")]
    Network(String),

    /// 上游请求超时
    #[error("请求超时: {0}")]
    Timeout(String),

    /// 图片解码/缩放/编码失败
    #[error("图像处理错误: {0}")]
    Image(String),

    /// 内部服务器错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误响应体：只有一个 `error` 字段
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    #[schema(example = "No image file provided.")]
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::MissingApiKey
            | AppError::Upstream { .. }
            | AppError::Network(_)
            | AppError::Timeout(_)
            | AppError::Image(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的稳定文案
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::MissingApiKey => MISSING_API_KEY_MESSAGE,
            AppError::MissingFile => MISSING_FILE_MESSAGE,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "请求处理失败: {}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "请求被拒绝: {}", self);
        }

        let body = ErrorBody {
            error: self.public_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("阻塞任务执行失败: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::time::Duration;

    async fn start_hanging_http_server() -> std::net::SocketAddr {
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind tcp listener");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            loop {
                let (socket, _) = match listener.accept().await {
                    Ok(v) => v,
                    Err(_) => break,
                };
                tokio::spawn(async move {
                    // 不返回任何 HTTP 响应，触发客户端 read timeout。
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    drop(socket);
                });
            }
        });

        addr
    }

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("parse json"))
    }

    #[tokio::test]
    async fn reqwest_timeout_maps_to_timeout_variant() {
        let addr = start_hanging_http_server().await;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("build reqwest client");

        let err = client
            .get(format!("http://{addr}/"))
            .send()
            .await
            .expect_err("expected timeout");

        let app: AppError = err.into();
        assert!(
            matches!(app, AppError::Timeout(_)),
            "expected AppError::Timeout, got: {app:?}"
        );
        assert_eq!(app.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn error_body_has_single_error_field() {
        let (status, json) = body_json(AppError::MissingFile).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, serde_json::json!({ "error": MISSING_FILE_MESSAGE }));

        let (status, json) = body_json(AppError::MissingApiKey).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({ "error": MISSING_API_KEY_MESSAGE }));
    }

    #[tokio::test]
    async fn upstream_detail_is_not_exposed() {
        let err = AppError::Upstream {
            status: 402,
            body: "insufficient credits".to_string(),
        };
        let (status, json) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
        assert!(!json.to_string().contains("credits"));
        assert!(!json.to_string().contains("402"));
    }
}
