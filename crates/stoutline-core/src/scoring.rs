use std::fmt;

use serde::Serialize;

use crate::analysis::AnalysisResult;
use crate::config::{ScoreMethod, ScoringConfig};
use crate::consts::{
    KEEP_ADJUSTING_SCORE, NOT_BAD_SCORE, PERFECT_SCORE, RATIO_SCORE_SLOPE, SCORE_DECIMALS,
    VERY_CLOSE_SCORE,
};

/// Qualitative band a score falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Feedback {
    Perfect,
    VeryClose,
    NotBad,
    KeepAdjusting,
    TryAgain,
}

impl Feedback {
    pub fn from_score(score: f32) -> Self {
        if score >= PERFECT_SCORE {
            Self::Perfect
        } else if score >= VERY_CLOSE_SCORE {
            Self::VeryClose
        } else if score >= NOT_BAD_SCORE {
            Self::NotBad
        } else if score >= KEEP_ADJUSTING_SCORE {
            Self::KeepAdjusting
        } else {
            Self::TryAgain
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Perfect => "Perfect split!",
            Self::VeryClose => "Very close!",
            Self::NotBad => "Not bad.",
            Self::KeepAdjusting => "Keep adjusting.",
            Self::TryAgain => "Try again.",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Which way the liquid line has to move to reach the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LevelHint {
    /// The liquid sits below the target line.
    Higher,
    /// The liquid sits above the target line.
    Lower,
}

impl fmt::Display for LevelHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Higher => write!(f, "go higher"),
            Self::Lower => write!(f, "go lower"),
        }
    }
}

/// Score of one analysis against a target fill.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScoreResult {
    /// 0-100, two decimal places.
    pub score: f32,
    /// Row of the target line inside the detected glass.
    pub target_row: usize,
    pub target_ratio: f32,
    pub fill_ratio: f32,
    pub feedback: Feedback,
    /// `None` when the score is already in the top tier or the level sits exactly on target.
    pub hint: Option<LevelHint>,
}

/// Round to the reported precision.
pub fn round_score(score: f32) -> f32 {
    let scale = 10f32.powi(SCORE_DECIMALS);
    (score * scale).round() / scale
}

fn clamp_score(score: f32) -> f32 {
    // max/min rather than clamp so a NaN collapses to 0.
    score.max(0.0).min(100.0)
}

/// `100 - |actual - target| * 200`, clamped to [0, 100].
///
/// Drops to zero at 50 percentage points off target.
pub fn score_ratio(actual_ratio: f32, target_ratio: f32) -> f32 {
    let raw = 100.0 - (actual_ratio - target_ratio).abs() * RATIO_SCORE_SLOPE;
    round_score(clamp_score(raw))
}

/// Linear falloff on the row distance to the target line.
///
/// `max_deviation` is a fraction of `glass_height`, so the score does not depend
/// on capture resolution. Zero beyond that distance.
pub fn score_rows(level_row: f32, target_row: f32, glass_height: f32, max_deviation: f32) -> f32 {
    let allowed = max_deviation * glass_height;
    if allowed <= 0.0 {
        return if level_row == target_row { 100.0 } else { 0.0 };
    }
    let raw = 100.0 - (level_row - target_row).abs() / allowed * 100.0;
    round_score(clamp_score(raw))
}

/// Score an analysis result with the configured method and target.
pub fn score_analysis(analysis: &AnalysisResult, config: &ScoringConfig) -> ScoreResult {
    let geometry = &analysis.geometry;
    let target_line = geometry.row_for_ratio(config.target_ratio);

    let score = match config.method {
        ScoreMethod::Ratio => score_ratio(analysis.fill_ratio, config.target_ratio),
        ScoreMethod::RowDistance { max_deviation } => score_rows(
            geometry.liquid_level as f32,
            target_line,
            geometry.glass_height() as f32,
            max_deviation,
        ),
    };

    let feedback = Feedback::from_score(score);
    let level = geometry.liquid_level as f32;
    let hint = if feedback == Feedback::Perfect || level == target_line {
        None
    } else if level < target_line {
        Some(LevelHint::Lower)
    } else {
        Some(LevelHint::Higher)
    };

    ScoreResult {
        score,
        target_row: target_line.round().max(0.0) as usize,
        target_ratio: config.target_ratio,
        fill_ratio: analysis.fill_ratio,
        feedback,
        hint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_tiers() {
        assert_eq!(Feedback::from_score(100.0), Feedback::Perfect);
        assert_eq!(Feedback::from_score(95.0), Feedback::Perfect);
        assert_eq!(Feedback::from_score(94.99), Feedback::VeryClose);
        assert_eq!(Feedback::from_score(70.0), Feedback::NotBad);
        assert_eq!(Feedback::from_score(50.0), Feedback::KeepAdjusting);
        assert_eq!(Feedback::from_score(0.0), Feedback::TryAgain);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_score(96.153_85), 96.15);
        assert_eq!(round_score(12.345_9), 12.35);
    }

    #[test]
    fn nan_scores_collapse_to_zero() {
        assert_eq!(score_ratio(f32::NAN, 0.75), 0.0);
    }
}
