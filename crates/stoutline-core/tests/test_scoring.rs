mod common;

use approx::assert_relative_eq;

use stoutline_core::buffer::PixelBuffer;
use stoutline_core::config::{AnalyzerConfig, ScoreMethod};
use stoutline_core::scoring::{score_ratio, score_rows, Feedback, LevelHint};
use stoutline_core::{Analyzer, ScoreResult};

use common::reference_capture;

fn score_reference(edit: impl FnOnce(&mut AnalyzerConfig)) -> ScoreResult {
    let mut config = AnalyzerConfig::default();
    edit(&mut config);
    let analyzer = Analyzer::new(config).unwrap();
    let data = reference_capture();
    let buffer = PixelBuffer::new(&data, 640, 480).unwrap();
    analyzer.evaluate(&buffer).unwrap().1
}

#[test]
fn test_exact_target_scores_full_marks() {
    assert_eq!(score_ratio(0.75, 0.75), 100.0);
    assert_eq!(score_ratio(0.3, 0.3), 100.0);
    assert_eq!(score_rows(126.0, 126.0, 312.0, 0.05), 100.0);
}

#[test]
fn test_score_falls_with_distance() {
    let mut last = f32::INFINITY;
    for step in 0..=10 {
        let actual = 0.75 - step as f32 * 0.05;
        let score = score_ratio(actual, 0.75);
        assert!(score <= last, "score rose at {actual}: {score} > {last}");
        last = score;
    }
    assert_relative_eq!(score_ratio(0.70, 0.75), 90.0, epsilon = 0.01);
    assert_relative_eq!(score_ratio(0.80, 0.75), 90.0, epsilon = 0.01);
}

#[test]
fn test_score_is_clamped() {
    assert_eq!(score_ratio(0.0, 0.75), 0.0);
    assert_eq!(score_ratio(1.0, 0.0), 0.0);
    assert_eq!(score_rows(0.0, 400.0, 300.0, 0.05), 0.0);
}

#[test]
fn test_row_score_independent_of_resolution() {
    let small = score_rows(130.0, 126.0, 312.0, 0.05);
    let large = score_rows(260.0, 252.0, 624.0, 0.05);
    assert_relative_eq!(small, 74.36, epsilon = 0.01);
    assert_relative_eq!(small, large, epsilon = 0.01);
}

#[test]
fn test_reference_capture_score() {
    let score = score_reference(|_| {});
    assert_relative_eq!(score.score, 96.15, epsilon = 1e-4);
    assert_eq!(score.target_row, 126);
    assert_eq!(score.feedback, Feedback::Perfect);
    assert_eq!(score.hint, None);
    assert_relative_eq!(score.target_ratio, 0.75);
    assert_relative_eq!(score.fill_ratio, 240.0 / 312.0, epsilon = 1e-6);
}

#[test]
fn test_overfilled_glass_asks_to_go_lower() {
    let score = score_reference(|c| c.scoring.target_ratio = 0.5);
    assert_eq!(score.target_row, 204);
    assert_eq!(score.feedback, Feedback::TryAgain);
    assert_eq!(score.hint, Some(LevelHint::Lower));
    assert_eq!(LevelHint::Lower.to_string(), "go lower");
}

#[test]
fn test_underfilled_glass_asks_to_go_higher() {
    let score = score_reference(|c| c.scoring.target_ratio = 0.95);
    assert_relative_eq!(score.score, 63.85, epsilon = 0.01);
    assert_eq!(score.feedback, Feedback::KeepAdjusting);
    assert_eq!(score.hint, Some(LevelHint::Higher));
}

#[test]
fn test_row_distance_method() {
    let score = score_reference(|c| {
        c.scoring.method = ScoreMethod::RowDistance {
            max_deviation: 0.05,
        }
    });
    // Six rows off with a tolerance of 5% of a 312-row glass.
    assert_relative_eq!(score.score, 61.54, epsilon = 0.01);
    assert_eq!(score.feedback, Feedback::KeepAdjusting);
    assert_eq!(score.hint, Some(LevelHint::Lower));
}

#[test]
fn test_feedback_messages() {
    assert_eq!(Feedback::Perfect.to_string(), "Perfect split!");
    assert_eq!(Feedback::from_score(90.0), Feedback::VeryClose);
    assert_eq!(Feedback::from_score(49.99), Feedback::TryAgain);
    assert_eq!(Feedback::TryAgain.message(), "Try again.");
}
