pub mod handler;
mod overlay;

pub use handler::create_corners_router;
pub use overlay::{
    Anchor, MARKER_COLOR, PixelOverlay, apply_overlays, composite, corner_markers,
    mark_corners_png,
};
