mod client;
pub mod handler;
mod resize;

pub use client::SegmentationClient;
pub use handler::create_cutout_router;
pub use resize::{OutputSize, resize_to_png};
