use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppConfig;
use crate::cors::build_cors_layer;
use crate::features::{corners, cutout, health};
use crate::openapi::ApiDoc;
use crate::request_id::request_id_middleware;
use crate::state::AppState;

/// 组装完整路由（main 与集成测试共用）
pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::<AppState>::new()
        .route("/health", get(health::health_check))
        .merge(cutout::create_cutout_router())
        .merge(corners::create_corners_router())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // 上传大小只受内存限制，关闭框架默认的 2MB 请求体上限
        .layer(DefaultBodyLimit::disable())
        .with_state(state);

    if let Some(cors) = build_cors_layer(&config.cors) {
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
}
