pub mod boundary;
pub mod darkness;
pub mod level;
pub mod rim_edge;

use std::fmt;

use serde::Serialize;

use crate::config::{DetectionConfig, StrategyKind};
use crate::sampler::RowProfile;

pub use boundary::{combine_rims, detect_base, detect_rim, rim_candidates, EdgeCandidate};
pub use darkness::DarknessThresholdStrategy;
pub use level::{color_difference_level, sliding_contrast_level, LevelEstimate};
pub use rim_edge::RimEdgeStrategy;

/// Detected glass lines, as image row indices.
///
/// Always satisfies `rim_top < base_bottom` and
/// `rim_top <= liquid_level <= base_bottom` when built through [`GlassGeometry::clamped`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GlassGeometry {
    pub rim_top: usize,
    pub base_bottom: usize,
    pub liquid_level: usize,
}

impl GlassGeometry {
    /// Enforce the geometry invariants for an image of `image_height` rows,
    /// returning a note for every value that had to move.
    pub fn clamped(
        rim_top: usize,
        liquid_level: usize,
        base_bottom: usize,
        image_height: usize,
    ) -> (Self, Vec<DetectionNote>) {
        let mut notes = Vec::new();
        let last_row = image_height.saturating_sub(1).max(1);

        let base = base_bottom.clamp(1, last_row);
        if base != base_bottom {
            notes.push(DetectionNote::Clamped {
                field: GeometryField::Base,
                from: base_bottom,
                to: base,
            });
        }

        let rim = rim_top.min(base - 1);
        if rim != rim_top {
            notes.push(DetectionNote::Clamped {
                field: GeometryField::Rim,
                from: rim_top,
                to: rim,
            });
        }

        let level = liquid_level.clamp(rim, base);
        if level != liquid_level {
            notes.push(DetectionNote::Clamped {
                field: GeometryField::Level,
                from: liquid_level,
                to: level,
            });
        }

        (
            Self {
                rim_top: rim,
                base_bottom: base,
                liquid_level: level,
            },
            notes,
        )
    }

    /// Rows from rim to base.
    pub fn glass_height(&self) -> usize {
        self.base_bottom.saturating_sub(self.rim_top)
    }

    /// Fraction of the glass below the liquid line, in [0, 1].
    pub fn fill_ratio(&self) -> f32 {
        let height = self.glass_height();
        if height == 0 {
            return 0.0;
        }
        let filled = self.base_bottom.saturating_sub(self.liquid_level);
        (filled as f32 / height as f32).clamp(0.0, 1.0)
    }

    /// Row (fractional) at which the glass would be `ratio` full.
    pub fn row_for_ratio(&self, ratio: f32) -> f32 {
        self.base_bottom as f32 - ratio * self.glass_height() as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GeometryField {
    Rim,
    Base,
    Level,
}

impl fmt::Display for GeometryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rim => write!(f, "rim"),
            Self::Base => write!(f, "base"),
            Self::Level => write!(f, "liquid level"),
        }
    }
}

/// Reasons a detection is less certain than a clean edge-based result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DetectionNote {
    /// No rim edge passed the strength threshold; the configured rim row was used.
    RimFallback,
    /// No base edge passed the strength threshold; the configured base row was used.
    BaseFallback,
    /// No liquid transition passed the acceptance threshold; the fallback policy was used.
    LevelFallback,
    /// A detected line violated the geometry invariants and was moved.
    Clamped {
        field: GeometryField,
        from: usize,
        to: usize,
    },
}

impl DetectionNote {
    /// Notes that make the whole result low-confidence.
    pub fn lowers_confidence(&self) -> bool {
        matches!(self, Self::LevelFallback | Self::Clamped { .. })
    }
}

impl fmt::Display for DetectionNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RimFallback => write!(f, "rim not found, using default rim row"),
            Self::BaseFallback => write!(f, "base not found, using default base row"),
            Self::LevelFallback => write!(f, "no liquid transition found, using fallback level"),
            Self::Clamped { field, from, to } => {
                write!(f, "{field} clamped from row {from} to row {to}")
            }
        }
    }
}

/// Output of one boundary detection.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub geometry: GlassGeometry,
    pub notes: Vec<DetectionNote>,
    /// Acceptance score of the liquid transition (0 when the fallback was used).
    pub level_strength: f32,
}

impl Detection {
    pub fn low_confidence(&self) -> bool {
        self.notes.iter().any(DetectionNote::lowers_confidence)
    }
}

/// Row statistics handed to a strategy.
#[derive(Clone, Copy, Debug)]
pub struct DetectionInput<'a> {
    /// Image height in rows.
    pub height: usize,
    /// Statistics of the full sampled band.
    pub profile: &'a RowProfile,
    /// Left and right half-band statistics for independent rim detection.
    pub halves: Option<(&'a RowProfile, &'a RowProfile)>,
}

/// A boundary detector: turns row statistics into glass geometry.
pub trait DetectionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn detect(&self, input: &DetectionInput<'_>) -> Detection;
}

/// Build the strategy selected in `config`.
pub fn strategy_for(config: &DetectionConfig) -> Box<dyn DetectionStrategy> {
    match config.strategy {
        StrategyKind::RimEdge => Box::new(RimEdgeStrategy::new(config.clone())),
        StrategyKind::DarknessThreshold => {
            Box::new(DarknessThresholdStrategy::new(config.clone()))
        }
    }
}
