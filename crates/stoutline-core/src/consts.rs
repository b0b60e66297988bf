/// Minimum pixel count (band width * rows) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// Smallest image side the sampler can work with (one row above, one below).
pub const MIN_IMAGE_SIDE: usize = 3;

/// Bytes per RGBA pixel.
pub const RGBA_CHANNELS: usize = 4;

/// Default capture surface width used when resizing input images.
pub const DEFAULT_CAPTURE_WIDTH: u32 = 640;

/// Default capture surface height used when resizing input images.
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 480;

/// A pixel is dark when R, G and B are all below this value.
pub const DEFAULT_DARKNESS_THRESHOLD: u8 = 60;

/// Sum of brightness differences to both vertical neighbours that marks an edge pixel.
pub const DEFAULT_EDGE_THRESHOLD: f32 = 30.0;

/// Deviation from the neighbour average that also marks an edge pixel.
pub const DEFAULT_EDGE_DEVIATION_THRESHOLD: f32 = 20.0;

/// Brightness difference between the rows above and below that marks a transition pixel.
pub const DEFAULT_TRANSITION_THRESHOLD: f32 = 20.0;

/// Left edge of the sampled column band, as a fraction of image width.
pub const DEFAULT_BAND_START: f32 = 1.0 / 3.0;

/// Right edge of the sampled column band, as a fraction of image width.
pub const DEFAULT_BAND_END: f32 = 2.0 / 3.0;

/// Minimum edge intensity for a row to count as a rim or base candidate.
pub const DEFAULT_MIN_EDGE_STRENGTH: f32 = 0.15;

/// Number of strongest rim candidates kept before taking the topmost.
pub const DEFAULT_RIM_CANDIDATES: usize = 3;

/// Rim search window start (fraction of height).
pub const DEFAULT_RIM_WINDOW_START: f32 = 0.05;

/// Rim search window end (fraction of height).
pub const DEFAULT_RIM_WINDOW_END: f32 = 0.5;

/// Base search window start (fraction of height).
pub const DEFAULT_BASE_WINDOW_START: f32 = 0.6;

/// Base search window end (fraction of height).
pub const DEFAULT_BASE_WINDOW_END: f32 = 0.9;

/// Rim row used when no rim edge is found (fraction of height).
pub const DEFAULT_RIM_FALLBACK: f32 = 0.1;

/// Base row used when no base edge is found (fraction of height).
pub const DEFAULT_BASE_FALLBACK: f32 = 0.75;

/// Rows averaged on each side of a candidate liquid line.
pub const DEFAULT_LEVEL_WINDOW: usize = 10;

/// Minimum dark-ratio contrast accepted by the sliding-window level scan.
pub const DEFAULT_MIN_LEVEL_CONTRAST: f32 = 0.3;

/// Minimum summed brightness + RGB difference accepted by the colour-difference scan.
pub const DEFAULT_MIN_COLOR_DIFFERENCE: f32 = 30.0;

/// Dark ratio a row needs to count as liquid for the darkness-threshold strategy.
pub const DEFAULT_MIN_DARK_RATIO: f32 = 0.5;

/// Liquid row used by the image-fraction fallback (fraction of height from the top).
pub const DEFAULT_LEVEL_FALLBACK_FRACTION: f32 = 0.75;

/// Target fill ratio: three-quarters full.
pub const DEFAULT_TARGET_RATIO: f32 = 0.75;

/// Score lost per unit of ratio deviation (100 points over half the glass).
pub const RATIO_SCORE_SLOPE: f32 = 200.0;

/// Row-distance scoring: deviation (fraction of glass height) at which the score reaches zero.
pub const DEFAULT_MAX_ROW_DEVIATION: f32 = 0.05;

/// Scores are reported with this many decimal places.
pub const SCORE_DECIMALS: i32 = 2;

/// Lower bounds of the feedback tiers.
pub const PERFECT_SCORE: f32 = 95.0;
pub const VERY_CLOSE_SCORE: f32 = 85.0;
pub const NOT_BAD_SCORE: f32 = 70.0;
pub const KEEP_ADJUSTING_SCORE: f32 = 50.0;
