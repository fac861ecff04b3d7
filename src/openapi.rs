use utoipa::{OpenApi, ToSchema};

/// 两个图片接口共用的 multipart 表单
#[derive(ToSchema)]
pub struct ImageUploadForm {
    /// 待处理的图片文件
    #[schema(value_type = String, format = Binary)]
    pub image_file: Vec<u8>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::features::health::handler::health_check,
        crate::features::cutout::handler::process_image,
        crate::features::corners::handler::add_corner_pixels,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::features::health::handler::HealthResponse,
        ImageUploadForm,
    )),
    tags(
        (
            name = "Image",
            description = "图片处理：上游抠图 + 缩放，以及四角像素标记（均输出 PNG）。"
        ),
        (name = "Health", description = "健康检查：服务探活。"),
    ),
    info(
        title = "Cutout Relay API",
        version = env!("CARGO_PKG_VERSION"),
        description = "图片抠图中转服务（Axum + utoipa）。"
    )
)]
pub struct ApiDoc;
