mod common;

use image::{Rgba, RgbaImage};
use tempfile::tempdir;

use stoutline_core::buffer::PixelBuffer;
use stoutline_core::io::{load_capture, save_overlay, CaptureSize};
use stoutline_core::overlay::{build_overlay, OverlayStyle};
use stoutline_core::StoutError;

use common::{default_analyzer, reference_capture};

fn reference_image() -> RgbaImage {
    RgbaImage::from_raw(640, 480, reference_capture()).unwrap()
}

#[test]
fn test_load_capture_keeps_native_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("capture.png");
    reference_image().save(&path).unwrap();

    let loaded = load_capture(&path, None).unwrap();
    assert_eq!(loaded.dimensions(), (640, 480));
    assert_eq!(loaded.get_pixel(10, 10).0, [200, 200, 200, 255]);
    assert_eq!(loaded.get_pixel(10, 300).0, [20, 20, 20, 255]);
}

#[test]
fn test_resized_capture_keeps_level_position() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("capture.png");
    reference_image().save(&path).unwrap();

    let size = CaptureSize {
        width: 320,
        height: 240,
    };
    let loaded = load_capture(&path, Some(size)).unwrap();
    assert_eq!(loaded.dimensions(), (320, 240));

    let buffer = PixelBuffer::from_image(&loaded).unwrap();
    let analysis = default_analyzer().analyze(&buffer).unwrap();
    assert!(analysis.geometry.liquid_level.abs_diff(60) <= 1);
}

#[test]
fn test_gray_image_is_expanded_to_rgba() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gray.png");
    image::GrayImage::from_pixel(8, 6, image::Luma([90])).save(&path).unwrap();

    let loaded = load_capture(&path, Some(CaptureSize { width: 8, height: 6 })).unwrap();
    assert_eq!(loaded.get_pixel(3, 3).0, [90, 90, 90, 255]);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_capture(&dir.path().join("missing.png"), None).unwrap_err();
    assert!(matches!(err, StoutError::ImageError(_) | StoutError::Io(_)));
}

#[test]
fn test_zero_capture_size_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("capture.png");
    RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let err = load_capture(&path, Some(CaptureSize { width: 0, height: 4 })).unwrap_err();
    assert!(matches!(err, StoutError::InvalidDimensions { .. }));
}

#[test]
fn test_save_overlay_writes_png() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("overlay.png");
    let capture = reference_image();
    let buffer = PixelBuffer::from_image(&capture).unwrap();
    let (analysis, score) = default_analyzer().evaluate(&buffer).unwrap();
    let style = OverlayStyle::default();
    let commands = build_overlay(&analysis, &score, &style);

    save_overlay(&capture, &commands, &out).unwrap();

    let saved = image::open(&out).unwrap().to_rgba8();
    assert_eq!(saved.dimensions(), (640, 480));
    assert_eq!(saved.get_pixel(300, 120).0, style.level_color);
    // The source capture is left untouched.
    assert_eq!(capture.get_pixel(300, 120).0, [20, 20, 20, 255]);
}
