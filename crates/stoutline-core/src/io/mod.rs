pub mod image_io;
pub mod raster;

pub use image_io::{load_capture, save_overlay, CaptureSize};
