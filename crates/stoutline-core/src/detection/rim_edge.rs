use std::ops::Range;

use tracing::{debug, warn};

use crate::buffer::{fraction_span, fraction_to_index};
use crate::config::{DetectionConfig, FallbackPolicy, LevelMethod, StrategyKind};
use crate::sampler::RowProfile;

use super::boundary::{combine_rims, detect_base, detect_rim};
use super::level::{color_difference_level, sliding_contrast_level, LevelEstimate};
use super::{Detection, DetectionInput, DetectionNote, DetectionStrategy, GlassGeometry};

/// Edge-based detector.
///
/// The base comes first, then the rim, then the liquid line strictly below the
/// rim. When no rim line is in view the rim search lands on the liquid step
/// itself and nothing is left below it; that step then becomes the liquid line
/// and the rim is searched again at least `level_window` rows above it.
#[derive(Clone, Debug)]
pub struct RimEdgeStrategy {
    config: DetectionConfig,
}

impl RimEdgeStrategy {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Rim row in `rows`, from the half-bands when they were sampled.
    fn find_rim(&self, input: &DetectionInput<'_>, rows: Range<usize>) -> Option<usize> {
        let cfg = &self.config;
        match input.halves {
            Some((left, right)) => combine_rims(
                detect_rim(left, rows.clone(), cfg.min_edge_strength, cfg.rim_candidates),
                detect_rim(right, rows, cfg.min_edge_strength, cfg.rim_candidates),
                cfg.prefer_near_rim,
            ),
            None => detect_rim(
                input.profile,
                rows,
                cfg.min_edge_strength,
                cfg.rim_candidates,
            ),
        }
    }
}

impl DetectionStrategy for RimEdgeStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RimEdge
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Detection {
        let cfg = &self.config;
        let h = input.height;
        let last_row = h.saturating_sub(1);
        let mut notes = Vec::new();

        let base_rows = fraction_span(cfg.base_window.start, cfg.base_window.end, h);
        let base = match detect_base(input.profile, base_rows, cfg.min_edge_strength) {
            Some(row) => row,
            None => {
                let row = fraction_to_index(cfg.base_fallback, h).min(last_row);
                debug!(row, "No base edge above threshold, using fallback");
                notes.push(DetectionNote::BaseFallback);
                row
            }
        };

        let rim_window = fraction_span(cfg.rim_window.start, cfg.rim_window.end, h);
        let rim = self.find_rim(input, rim_window.start..rim_window.end.min(base));

        // The window above each candidate starts below the rim row.
        let below_rim = rim.and_then(|row| find_level(cfg, input.profile, row + 1..base + 1));

        let (rim, level) = match (rim, below_rim) {
            (rim, Some(level)) => (rim, Some(level)),
            (rim, None) => {
                let level_top = fraction_to_index(cfg.rim_window.start, h);
                match find_level(cfg, input.profile, level_top..base + 1) {
                    Some(level)
                        if rim.map_or(true, |r| r.abs_diff(level.row) <= cfg.level_window) =>
                    {
                        debug!(
                            rim = ?rim,
                            level = level.row,
                            "Rim sits on the liquid step, searching above it"
                        );
                        let rim_end = rim_window
                            .end
                            .min(level.row.saturating_sub(cfg.level_window));
                        (self.find_rim(input, rim_window.start..rim_end), Some(level))
                    }
                    _ => (rim, None),
                }
            }
        };

        let level = level.unwrap_or_else(|| {
            let row = fallback_level(cfg.fallback, base, h);
            warn!(
                row,
                policy = %cfg.fallback,
                "No liquid transition above threshold, using fallback level"
            );
            notes.push(DetectionNote::LevelFallback);
            LevelEstimate { row, strength: 0.0 }
        });
        let rim = rim.unwrap_or_else(|| {
            let row = fraction_to_index(cfg.rim_fallback, h);
            debug!(row, "No rim edge above threshold, using fallback");
            notes.push(DetectionNote::RimFallback);
            row
        });

        let (geometry, clamp_notes) = GlassGeometry::clamped(rim, level.row, base, h);
        notes.extend(clamp_notes);

        debug!(
            rim = geometry.rim_top,
            level = geometry.liquid_level,
            base = geometry.base_bottom,
            strength = level.strength,
            "Rim-edge detection complete"
        );

        Detection {
            geometry,
            notes,
            level_strength: level.strength,
        }
    }
}

/// Run the configured liquid-level scan over `span`.
pub(crate) fn find_level(
    cfg: &DetectionConfig,
    profile: &RowProfile,
    span: Range<usize>,
) -> Option<LevelEstimate> {
    match cfg.level_method {
        LevelMethod::SlidingContrast => {
            sliding_contrast_level(profile, span, cfg.level_window, cfg.min_level_contrast)
        }
        LevelMethod::ColorDifference => {
            color_difference_level(profile, span, cfg.level_window, cfg.min_color_difference)
        }
    }
}

/// Liquid row used when no transition is accepted.
pub(crate) fn fallback_level(policy: FallbackPolicy, base: usize, height: usize) -> usize {
    match policy {
        FallbackPolicy::Base => base,
        FallbackPolicy::ImageFraction(f) => {
            fraction_to_index(f, height).min(height.saturating_sub(1))
        }
    }
}
