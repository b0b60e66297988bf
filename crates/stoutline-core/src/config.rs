use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, StoutError};

/// Every tunable of one analysis pass.
///
/// All fields have defaults, so a config file only needs the values it changes.
/// Call [`AnalyzerConfig::validate`] (or build an [`crate::Analyzer`], which does)
/// before analysing anything.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub sampler: SamplerConfig,
    #[serde(default)]
    pub band: BandConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        self.sampler.validate()?;
        self.band.validate()?;
        self.detection.validate()?;
        self.scoring.validate()
    }
}

/// Per-pixel thresholds used while building row statistics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// R, G and B all below this value make a pixel dark.
    #[serde(default = "default_darkness_threshold")]
    pub darkness_threshold: u8,
    /// Summed brightness difference to both neighbours that marks an edge.
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f32,
    /// Deviation from the neighbour average that also marks an edge.
    #[serde(default = "default_edge_deviation_threshold")]
    pub edge_deviation_threshold: f32,
    /// Brightness difference across a row that marks a transition.
    #[serde(default = "default_transition_threshold")]
    pub transition_threshold: f32,
}

fn default_darkness_threshold() -> u8 {
    DEFAULT_DARKNESS_THRESHOLD
}
fn default_edge_threshold() -> f32 {
    DEFAULT_EDGE_THRESHOLD
}
fn default_edge_deviation_threshold() -> f32 {
    DEFAULT_EDGE_DEVIATION_THRESHOLD
}
fn default_transition_threshold() -> f32 {
    DEFAULT_TRANSITION_THRESHOLD
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            darkness_threshold: DEFAULT_DARKNESS_THRESHOLD,
            edge_threshold: DEFAULT_EDGE_THRESHOLD,
            edge_deviation_threshold: DEFAULT_EDGE_DEVIATION_THRESHOLD,
            transition_threshold: DEFAULT_TRANSITION_THRESHOLD,
        }
    }
}

impl SamplerConfig {
    fn validate(&self) -> Result<()> {
        check_threshold("sampler.edge_threshold", self.edge_threshold)?;
        check_threshold(
            "sampler.edge_deviation_threshold",
            self.edge_deviation_threshold,
        )?;
        check_threshold("sampler.transition_threshold", self.transition_threshold)
    }
}

/// Sampled column band as fractions of the image width.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    #[serde(default = "default_band_start")]
    pub start: f32,
    #[serde(default = "default_band_end")]
    pub end: f32,
}

fn default_band_start() -> f32 {
    DEFAULT_BAND_START
}
fn default_band_end() -> f32 {
    DEFAULT_BAND_END
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            start: DEFAULT_BAND_START,
            end: DEFAULT_BAND_END,
        }
    }
}

impl BandConfig {
    fn validate(&self) -> Result<()> {
        check_window("band", self.start, self.end)
    }
}

/// Row range `[start, end)` as fractions of the image height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub start: f32,
    pub end: f32,
}

impl SearchWindow {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%-{:.0}%", self.start * 100.0, self.end * 100.0)
    }
}

/// Which boundary detector runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Edge-based rim and base detection with a liquid transition scan between them.
    #[default]
    RimEdge,
    /// Treats the guide region as the glass and finds the first uniformly dark rows.
    DarknessThreshold,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RimEdge => write!(f, "Rim Edge"),
            Self::DarknessThreshold => write!(f, "Darkness Threshold"),
        }
    }
}

/// How the liquid transition line is located between rim and base.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMethod {
    /// Global maximum of dark-ratio contrast between the windows above and below a row.
    #[default]
    SlidingContrast,
    /// Bottom-up scan of summed brightness and RGB differences between adjacent windows.
    ColorDifference,
}

impl fmt::Display for LevelMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlidingContrast => write!(f, "Sliding Contrast"),
            Self::ColorDifference => write!(f, "Color Difference"),
        }
    }
}

/// Liquid row used when no transition passes the acceptance threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum FallbackPolicy {
    /// Put the level on the base: 0% fill.
    #[default]
    Base,
    /// Put the level at this fraction of the image height, from the top.
    ImageFraction(f32),
}

impl fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "Base (empty)"),
            Self::ImageFraction(v) => write!(f, "Image Fraction ({:.0}%)", v * 100.0),
        }
    }
}

/// Boundary detection parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub level_method: LevelMethod,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    /// Minimum edge intensity for rim and base candidates.
    #[serde(default = "default_min_edge_strength")]
    pub min_edge_strength: f32,
    /// Strongest rim candidates considered before taking the topmost.
    #[serde(default = "default_rim_candidates")]
    pub rim_candidates: usize,
    #[serde(default = "default_rim_window")]
    pub rim_window: SearchWindow,
    #[serde(default = "default_base_window")]
    pub base_window: SearchWindow,
    /// Rim row (fraction of height) when no rim edge is found.
    #[serde(default = "default_rim_fallback")]
    pub rim_fallback: f32,
    /// Base row (fraction of height) when no base edge is found.
    #[serde(default = "default_base_fallback")]
    pub base_fallback: f32,
    /// Scan the left and right halves of the band separately for the rim.
    #[serde(default = "default_true")]
    pub split_rim: bool,
    /// Combine split rim candidates with max (nearer, lower rim) instead of min (far rim).
    #[serde(default)]
    pub prefer_near_rim: bool,
    /// Rows averaged on each side of a candidate liquid line.
    #[serde(default = "default_level_window")]
    pub level_window: usize,
    #[serde(default = "default_min_level_contrast")]
    pub min_level_contrast: f32,
    #[serde(default = "default_min_color_difference")]
    pub min_color_difference: f32,
    #[serde(default = "default_min_dark_ratio")]
    pub min_dark_ratio: f32,
}

fn default_min_edge_strength() -> f32 {
    DEFAULT_MIN_EDGE_STRENGTH
}
fn default_rim_candidates() -> usize {
    DEFAULT_RIM_CANDIDATES
}
fn default_rim_window() -> SearchWindow {
    SearchWindow::new(DEFAULT_RIM_WINDOW_START, DEFAULT_RIM_WINDOW_END)
}
fn default_base_window() -> SearchWindow {
    SearchWindow::new(DEFAULT_BASE_WINDOW_START, DEFAULT_BASE_WINDOW_END)
}
fn default_rim_fallback() -> f32 {
    DEFAULT_RIM_FALLBACK
}
fn default_base_fallback() -> f32 {
    DEFAULT_BASE_FALLBACK
}
fn default_true() -> bool {
    true
}
fn default_level_window() -> usize {
    DEFAULT_LEVEL_WINDOW
}
fn default_min_level_contrast() -> f32 {
    DEFAULT_MIN_LEVEL_CONTRAST
}
fn default_min_color_difference() -> f32 {
    DEFAULT_MIN_COLOR_DIFFERENCE
}
fn default_min_dark_ratio() -> f32 {
    DEFAULT_MIN_DARK_RATIO
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            level_method: LevelMethod::default(),
            fallback: FallbackPolicy::default(),
            min_edge_strength: DEFAULT_MIN_EDGE_STRENGTH,
            rim_candidates: DEFAULT_RIM_CANDIDATES,
            rim_window: default_rim_window(),
            base_window: default_base_window(),
            rim_fallback: DEFAULT_RIM_FALLBACK,
            base_fallback: DEFAULT_BASE_FALLBACK,
            split_rim: true,
            prefer_near_rim: false,
            level_window: DEFAULT_LEVEL_WINDOW,
            min_level_contrast: DEFAULT_MIN_LEVEL_CONTRAST,
            min_color_difference: DEFAULT_MIN_COLOR_DIFFERENCE,
            min_dark_ratio: DEFAULT_MIN_DARK_RATIO,
        }
    }
}

impl DetectionConfig {
    fn validate(&self) -> Result<()> {
        check_fraction("detection.min_edge_strength", self.min_edge_strength)?;
        check_fraction("detection.min_level_contrast", self.min_level_contrast)?;
        check_fraction("detection.min_dark_ratio", self.min_dark_ratio)?;
        check_threshold("detection.min_color_difference", self.min_color_difference)?;
        check_window(
            "detection.rim_window",
            self.rim_window.start,
            self.rim_window.end,
        )?;
        check_window(
            "detection.base_window",
            self.base_window.start,
            self.base_window.end,
        )?;
        check_fraction("detection.rim_fallback", self.rim_fallback)?;
        check_fraction("detection.base_fallback", self.base_fallback)?;

        if self.rim_fallback >= self.base_fallback {
            return Err(StoutError::Configuration(format!(
                "detection.rim_fallback ({}) must be above detection.base_fallback ({})",
                self.rim_fallback, self.base_fallback
            )));
        }
        if self.rim_candidates == 0 {
            return Err(StoutError::Configuration(
                "detection.rim_candidates must be at least 1".into(),
            ));
        }
        if self.level_window == 0 {
            return Err(StoutError::Configuration(
                "detection.level_window must be at least 1 row".into(),
            ));
        }
        if let FallbackPolicy::ImageFraction(v) = self.fallback {
            check_fraction("detection.fallback", v)?;
        }
        Ok(())
    }
}

/// How the detected level is turned into a score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ScoreMethod {
    /// `100 - |actual - target| * 200` on fill ratios.
    #[default]
    Ratio,
    /// Linear falloff on the row distance to the target line, reaching zero at
    /// `max_deviation` (fraction of the detected glass height).
    RowDistance {
        #[serde(default = "default_max_deviation")]
        max_deviation: f32,
    },
}

fn default_max_deviation() -> f32 {
    DEFAULT_MAX_ROW_DEVIATION
}

impl fmt::Display for ScoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ratio => write!(f, "Ratio"),
            Self::RowDistance { max_deviation } => {
                write!(f, "Row Distance (±{:.1}% of glass)", max_deviation * 100.0)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Desired fill ratio of the detected glass.
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f32,
    #[serde(default)]
    pub method: ScoreMethod,
}

fn default_target_ratio() -> f32 {
    DEFAULT_TARGET_RATIO
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            target_ratio: DEFAULT_TARGET_RATIO,
            method: ScoreMethod::default(),
        }
    }
}

impl ScoringConfig {
    fn validate(&self) -> Result<()> {
        check_fraction("scoring.target_ratio", self.target_ratio)?;
        if let ScoreMethod::RowDistance { max_deviation } = self.method {
            if !max_deviation.is_finite() || max_deviation <= 0.0 {
                return Err(StoutError::Configuration(format!(
                    "scoring.max_deviation must be positive, got {max_deviation}"
                )));
            }
        }
        Ok(())
    }
}

fn check_fraction(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(StoutError::Configuration(format!(
            "{name} must be in [0, 1], got {value}"
        )));
    }
    Ok(())
}

fn check_threshold(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoutError::Configuration(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn check_window(name: &str, start: f32, end: f32) -> Result<()> {
    check_fraction(name, start)?;
    check_fraction(name, end)?;
    if start >= end {
        return Err(StoutError::Configuration(format!(
            "{name} start ({start}) must be below end ({end})"
        )));
    }
    Ok(())
}
