mod common;

use approx::assert_relative_eq;

use stoutline_core::buffer::PixelBuffer;
use stoutline_core::config::StrategyKind;
use stoutline_core::detection::{
    Detection, DetectionInput, DetectionStrategy, GeometryField, GlassGeometry, DetectionNote,
};
use stoutline_core::scoring::Feedback;
use stoutline_core::{Analyzer, AnalyzerConfig, StoutError};

use common::{default_analyzer, reference_capture};

#[test]
fn test_reference_capture_end_to_end() {
    let data = reference_capture();
    let buffer = PixelBuffer::new(&data, 640, 480).unwrap();
    let (analysis, score) = default_analyzer().evaluate(&buffer).unwrap();

    assert_eq!(analysis.width, 640);
    assert_eq!(analysis.height, 480);
    assert_eq!(analysis.band().start_x, 213);
    assert_eq!(analysis.band().end_x, 427);
    assert_eq!(analysis.row_stats.len(), 480);
    assert_eq!(analysis.strategy, StrategyKind::RimEdge);

    assert_eq!(analysis.geometry.rim_top, 48);
    assert_eq!(analysis.geometry.liquid_level, 120);
    assert_eq!(analysis.geometry.base_bottom, 360);
    assert_relative_eq!(analysis.fill_ratio, 0.769_230_8, epsilon = 1e-6);
    assert!(!analysis.low_confidence);

    assert_relative_eq!(score.score, 96.15, epsilon = 1e-4);
    assert_eq!(score.target_row, 126);
    assert_eq!(score.feedback, Feedback::Perfect);
    assert!(score.hint.is_none());
}

#[test]
fn test_bad_buffer_is_rejected() {
    let data = vec![0u8; 100];
    let err = PixelBuffer::new(&data, 640, 480).unwrap_err();
    assert!(matches!(err, StoutError::InvalidInput(_)));

    let err = PixelBuffer::new(&[], 0, 0).unwrap_err();
    assert!(matches!(err, StoutError::InvalidInput(_)));
}

#[test]
fn test_tiny_image_is_rejected() {
    let data = vec![255u8; 2 * 2 * 4];
    let buffer = PixelBuffer::new(&data, 2, 2).unwrap();
    let err = default_analyzer().analyze(&buffer).unwrap_err();
    assert!(matches!(
        err,
        StoutError::InvalidDimensions {
            width: 2,
            height: 2
        }
    ));
}

#[test]
fn test_result_serializes_to_json() {
    let data = reference_capture();
    let buffer = PixelBuffer::new(&data, 640, 480).unwrap();
    let (analysis, score) = default_analyzer().evaluate(&buffer).unwrap();

    let value = serde_json::to_value(&analysis).unwrap();
    assert_eq!(value["geometry"]["liquid_level"], 120);
    assert_eq!(value["strategy"], "RimEdge");
    assert_eq!(value["notes"][0], "BaseFallback");
    assert_eq!(value["row_stats"]["stats"].as_array().unwrap().len(), 480);

    let value = serde_json::to_value(score).unwrap();
    assert_eq!(value["feedback"], "Perfect");
    assert_eq!(value["target_row"], 126);
    assert!(value["hint"].is_null());
}

/// Reports a fixed, out-of-order geometry to exercise clamping downstream.
struct Fixed;

impl DetectionStrategy for Fixed {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RimEdge
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Detection {
        let (geometry, notes) = GlassGeometry::clamped(100, 10, 900, input.height);
        Detection {
            geometry,
            notes,
            level_strength: 1.0,
        }
    }
}

#[test]
fn test_custom_strategy_and_clamping() {
    let analyzer = Analyzer::with_strategy(AnalyzerConfig::default(), Box::new(Fixed)).unwrap();
    let data = reference_capture();
    let buffer = PixelBuffer::new(&data, 640, 480).unwrap();
    let analysis = analyzer.analyze(&buffer).unwrap();

    assert_eq!(analysis.geometry.base_bottom, 479);
    assert_eq!(analysis.geometry.liquid_level, 100);
    assert_relative_eq!(analysis.fill_ratio, 1.0);
    assert!(analysis.low_confidence);
    assert!(analysis.notes.contains(&DetectionNote::Clamped {
        field: GeometryField::Base,
        from: 900,
        to: 479
    }));
    assert!(analysis.notes.contains(&DetectionNote::Clamped {
        field: GeometryField::Level,
        from: 10,
        to: 100
    }));
    assert_eq!(
        analysis.notes[0].to_string(),
        "base clamped from row 900 to row 479"
    );
}
