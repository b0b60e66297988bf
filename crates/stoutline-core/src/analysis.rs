use serde::Serialize;
use tracing::{debug, info};

use crate::buffer::{ColumnBand, PixelBuffer};
use crate::config::{AnalyzerConfig, StrategyKind};
use crate::consts::MIN_IMAGE_SIDE;
use crate::detection::{
    strategy_for, DetectionInput, DetectionNote, DetectionStrategy, GlassGeometry,
};
use crate::error::{Result, StoutError};
use crate::sampler::{sample_all_rows, RowProfile};
use crate::scoring::{score_analysis, ScoreResult};

/// Outcome of one analysis pass over a capture.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResult {
    /// `(base - level) / (base - rim)`, in [0, 1].
    pub fill_ratio: f32,
    pub geometry: GlassGeometry,
    /// Statistics of the sampled band, one entry per image row.
    pub row_stats: RowProfile,
    pub notes: Vec<DetectionNote>,
    /// Acceptance score of the liquid transition (0 when a fallback was used).
    pub level_strength: f32,
    pub low_confidence: bool,
    pub strategy: StrategyKind,
    pub width: usize,
    pub height: usize,
}

impl AnalysisResult {
    pub fn band(&self) -> ColumnBand {
        self.row_stats.band()
    }
}

/// Runs sampler, boundary detector and scorer over captures.
///
/// The configuration is validated once on construction; an `Analyzer` keeps no
/// state between captures.
pub struct Analyzer {
    config: AnalyzerConfig,
    strategy: Box<dyn DetectionStrategy>,
}

impl Analyzer {
    /// Validate `config` and build the detector it selects.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let strategy = strategy_for(&config.detection);
        Ok(Self { config, strategy })
    }

    /// Use a custom detector instead of the one named in `config.detection.strategy`.
    pub fn with_strategy(
        config: AnalyzerConfig,
        strategy: Box<dyn DetectionStrategy>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, strategy })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Locate rim, base and liquid line in `buffer` and derive the fill ratio.
    pub fn analyze(&self, buffer: &PixelBuffer<'_>) -> Result<AnalysisResult> {
        let (w, h) = (buffer.width(), buffer.height());
        if w < MIN_IMAGE_SIDE || h < MIN_IMAGE_SIDE {
            return Err(StoutError::InvalidDimensions {
                width: w,
                height: h,
            });
        }

        let band = ColumnBand::from_fractions(w, self.config.band.start, self.config.band.end);
        debug!(
            width = w,
            height = h,
            band_start = band.start_x,
            band_end = band.end_x,
            "Sampling rows"
        );
        let profile = sample_all_rows(buffer, band, &self.config.sampler);

        let halves = if self.config.detection.split_rim {
            band.split().map(|(left, right)| {
                (
                    sample_all_rows(buffer, left, &self.config.sampler),
                    sample_all_rows(buffer, right, &self.config.sampler),
                )
            })
        } else {
            None
        };

        let input = DetectionInput {
            height: h,
            profile: &profile,
            halves: halves.as_ref().map(|(l, r)| (l, r)),
        };
        let detection = self.strategy.detect(&input);
        let low_confidence = detection.low_confidence();
        let fill_ratio = detection.geometry.fill_ratio();

        info!(
            strategy = %self.strategy.kind(),
            fill_ratio,
            low_confidence,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            fill_ratio,
            geometry: detection.geometry,
            row_stats: profile,
            notes: detection.notes,
            level_strength: detection.level_strength,
            low_confidence,
            strategy: self.strategy.kind(),
            width: w,
            height: h,
        })
    }

    /// Score an analysis against the configured target.
    pub fn score(&self, analysis: &AnalysisResult) -> ScoreResult {
        score_analysis(analysis, &self.config.scoring)
    }

    /// Analyze and score in one call.
    pub fn evaluate(&self, buffer: &PixelBuffer<'_>) -> Result<(AnalysisResult, ScoreResult)> {
        let analysis = self.analyze(buffer)?;
        let score = self.score(&analysis);
        Ok((analysis, score))
    }
}
