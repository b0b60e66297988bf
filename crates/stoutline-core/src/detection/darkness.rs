use tracing::{debug, warn};

use crate::buffer::fraction_to_index;
use crate::config::{DetectionConfig, StrategyKind};
use crate::sampler::RowProfile;

use super::level::LevelEstimate;
use super::rim_edge::fallback_level;
use super::{Detection, DetectionInput, DetectionNote, DetectionStrategy, GlassGeometry};

/// Detector for a uniformly dark liquid.
///
/// The rim and base are the edges of the guide region (top of the rim window,
/// last row of the base window). The liquid line is the first row below the rim
/// that is dark and stays dark, on average, for the next `level_window` rows.
#[derive(Clone, Debug)]
pub struct DarknessThresholdStrategy {
    config: DetectionConfig,
}

impl DarknessThresholdStrategy {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    fn first_dark_run(&self, profile: &RowProfile, rim: usize, base: usize) -> Option<LevelEstimate> {
        let cfg = &self.config;
        let rows = profile.clip(rim + 1..base + 1);

        for y in rows.clone() {
            let Some(stat) = profile.get(y) else {
                continue;
            };
            if stat.dark_ratio < cfg.min_dark_ratio {
                continue;
            }

            let run_end = (y + cfg.level_window).min(rows.end);
            let run: Vec<f32> = (y..run_end)
                .filter_map(|r| profile.get(r).map(|s| s.dark_ratio))
                .collect();
            let mean = run.iter().sum::<f32>() / run.len() as f32;
            if mean >= cfg.min_dark_ratio {
                return Some(LevelEstimate {
                    row: y,
                    strength: mean,
                });
            }
        }
        None
    }
}

impl DetectionStrategy for DarknessThresholdStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DarknessThreshold
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Detection {
        let cfg = &self.config;
        let h = input.height;
        let mut notes = Vec::new();

        let rim = fraction_to_index(cfg.rim_window.start, h);
        let base = fraction_to_index(cfg.base_window.end, h)
            .saturating_sub(1)
            .min(h.saturating_sub(1));

        let level = match self.first_dark_run(input.profile, rim, base) {
            Some(est) => est,
            None => {
                let row = fallback_level(cfg.fallback, base, h);
                warn!(row, policy = %cfg.fallback, "No dark liquid rows found, using fallback level");
                notes.push(DetectionNote::LevelFallback);
                LevelEstimate { row, strength: 0.0 }
            }
        };

        let (geometry, clamp_notes) = GlassGeometry::clamped(rim, level.row, base, h);
        notes.extend(clamp_notes);

        debug!(
            rim = geometry.rim_top,
            level = geometry.liquid_level,
            base = geometry.base_bottom,
            "Darkness-threshold detection complete"
        );

        Detection {
            geometry,
            notes,
            level_strength: level.strength,
        }
    }
}
