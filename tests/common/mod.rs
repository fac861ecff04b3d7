//! 集成测试公共工具：本地模拟上游抠图服务、multipart 请求构造、图片生成。
#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::{Body, to_bytes},
    extract::{Multipart, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use image::{DynamicImage, ImageFormat, RgbaImage};
use tokio::net::TcpListener;

use cutout_relay::{ApiCredential, AppConfig, AppState, build_app};

pub const BOUNDARY: &str = "----cutout-relay-test-boundary";

/// 模拟上游的响应方式
#[derive(Clone)]
pub enum UpstreamReply {
    /// 把收到的文件原样返回（200 image/png）
    Echo,
    /// 固定状态码与响应体
    Fixed { status: u16, body: Vec<u8> },
}

/// 最近一次上游请求的关键信息
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub api_key: Option<String>,
    pub field: Option<String>,
    pub filename: Option<String>,
}

#[derive(Clone)]
struct MockState {
    reply: UpstreamReply,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Recorded>>,
}

pub struct MockUpstream {
    pub endpoint: String,
    calls: Arc<AtomicUsize>,
    last: Arc<Mutex<Recorded>>,
}

impl MockUpstream {
    pub async fn start(reply: UpstreamReply) -> Self {
        let calls = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            reply,
            calls: calls.clone(),
            last: last.clone(),
        };
        let app = Router::new()
            .route("/v1.0/removebg", post(mock_removebg))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            endpoint: format!("http://{addr}/v1.0/removebg"),
            calls,
            last,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> Recorded {
        self.last.lock().expect("lock recorded").clone()
    }
}

async fn mock_removebg(
    State(state): State<MockState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);

    let mut recorded = Recorded {
        api_key: headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ..Recorded::default()
    };
    let mut echoed = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        recorded.field = field.name().map(str::to_string);
        recorded.filename = field.file_name().map(str::to_string);
        echoed = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
    }
    *state.last.lock().expect("lock recorded") = recorded;

    match state.reply {
        UpstreamReply::Echo => {
            (StatusCode::OK, [(header::CONTENT_TYPE, "image/png")], echoed).into_response()
        }
        UpstreamReply::Fixed { status, body } => (
            StatusCode::from_u16(status).expect("valid status"),
            body,
        )
            .into_response(),
    }
}

/// 指向给定上游端点的完整应用
pub fn test_app(api_key: Option<&str>, endpoint: &str) -> Router {
    let mut config = AppConfig::default();
    config.segmentation.endpoint = endpoint.to_string();
    config.segmentation.timeout_secs = 5;
    let state = AppState::new(
        &config.segmentation,
        ApiCredential::new(api_key.map(str::to_string)),
    )
    .expect("build app state");
    build_app(state, &config)
}

/// 单文件字段的 multipart 请求
pub fn upload_request(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build request")
}

/// 只有普通文本字段、没有文件的 multipart 请求
pub fn request_without_file(uri: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"comment\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build request")
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

pub fn png_of(img: RgbaImage) -> Vec<u8> {
    encode(&DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

/// 每个像素都不同的 RGBA 测试图
pub fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([
            (x * 37 % 256) as u8,
            (y * 53 % 256) as u8,
            ((x * y) % 251) as u8,
            (64 + (x + y) % 128) as u8,
        ])
    })
}

pub async fn body_bytes(resp: Response) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = body_bytes(resp).await;
    serde_json::from_slice(&bytes).expect("parse json body")
}

pub fn content_type(resp: &Response) -> String {
    resp.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}
