use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// 请求 ID 头
pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_LEN: usize = 128;

/// 单个请求的追踪 ID，存放在请求 extensions 中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// 客户端传入值：仅允许字母数字与 `-` `_` `.`，长度不超过 128。
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let ok = !raw.is_empty()
            && raw.len() <= MAX_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
        ok.then(|| Self(raw.to_string()))
    }

    pub fn generate() -> Self {
        Self(format!("req_{}", Uuid::new_v4().simple()))
    }

    /// 优先沿用请求头中的合法值，否则生成新的
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse)
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 请求在携带 request_id 的 span 内处理，响应头回写同一个 ID。
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(req.headers());
    let span = tracing::info_span!(
        "request",
        request_id = request_id.as_str(),
        method = %req.method(),
        path = %req.uri().path(),
    );
    let header = HeaderValue::from_str(request_id.as_str()).ok();
    req.extensions_mut().insert(request_id);

    let mut res = next.run(req).instrument(span).await;
    if let Some(value) = header {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}
