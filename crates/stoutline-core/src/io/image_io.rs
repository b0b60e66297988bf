use std::path::Path;

use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{DEFAULT_CAPTURE_HEIGHT, DEFAULT_CAPTURE_WIDTH};
use crate::error::{Result, StoutError};
use crate::overlay::{render, DrawCommand};

/// Fixed capture surface size that input images are resized to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CaptureSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CAPTURE_WIDTH,
            height: DEFAULT_CAPTURE_HEIGHT,
        }
    }
}

/// Decode an image file into 8-bit RGBA, optionally resized to `size`.
pub fn load_capture(path: &Path, size: Option<CaptureSize>) -> Result<RgbaImage> {
    let img = image::open(path)?;
    let rgba = img.to_rgba8();

    let Some(size) = size else {
        return Ok(rgba);
    };
    if size.width == 0 || size.height == 0 {
        return Err(StoutError::InvalidDimensions {
            width: size.width as usize,
            height: size.height as usize,
        });
    }
    if rgba.dimensions() == (size.width, size.height) {
        return Ok(rgba);
    }

    debug!(
        from_width = rgba.width(),
        from_height = rgba.height(),
        to_width = size.width,
        to_height = size.height,
        "Resizing capture"
    );
    Ok(image::imageops::resize(
        &rgba,
        size.width,
        size.height,
        FilterType::Triangle,
    ))
}

/// Draw `commands` over a copy of `capture` and save it as PNG.
pub fn save_overlay(capture: &RgbaImage, commands: &[DrawCommand], path: &Path) -> Result<()> {
    let mut canvas = capture.clone();
    render(commands, &mut canvas);
    canvas.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
