use std::ops::Range;

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use serde::Serialize;

use crate::buffer::{ColumnBand, PixelBuffer};
use crate::config::SamplerConfig;
use crate::consts::{PARALLEL_PIXEL_THRESHOLD, RGBA_CHANNELS};

/// Aggregate statistics of one image row over the sampled band.
///
/// The three intensities are fractions of band pixels in [0, 1]; the means are
/// 0-255 channel averages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RowStatistic {
    pub dark_ratio: f32,
    pub edge_intensity: f32,
    pub transition_intensity: f32,
    pub brightness: f32,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

/// Row statistics of one band, indexed by absolute image row.
#[derive(Clone, Debug, Serialize)]
pub struct RowProfile {
    first_row: usize,
    band: ColumnBand,
    stats: Vec<RowStatistic>,
}

impl RowProfile {
    pub fn new(first_row: usize, band: ColumnBand, stats: Vec<RowStatistic>) -> Self {
        Self {
            first_row,
            band,
            stats,
        }
    }

    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// One past the last sampled row.
    pub fn end_row(&self) -> usize {
        self.first_row + self.stats.len()
    }

    pub fn band(&self) -> ColumnBand {
        self.band
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&RowStatistic> {
        row.checked_sub(self.first_row)
            .and_then(|i| self.stats.get(i))
    }

    pub fn stats(&self) -> &[RowStatistic] {
        &self.stats
    }

    /// `(row, statistic)` pairs for every sampled row.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &RowStatistic)> + '_ {
        self.stats
            .iter()
            .enumerate()
            .map(move |(i, s)| (self.first_row + i, s))
    }

    /// Clip `rows` to the sampled range.
    pub fn clip(&self, rows: Range<usize>) -> Range<usize> {
        let start = rows.start.max(self.first_row);
        let end = rows.end.min(self.end_row());
        start..end.max(start)
    }
}

/// Mean of R, G and B.
#[inline]
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

/// Brightness of every band pixel for the whole image height, shape `(height, band width)`.
///
/// The band is clipped to the image width first.
pub fn brightness_plane(buffer: &PixelBuffer, band: ColumnBand) -> Array2<f32> {
    let band = band.clip(buffer.width());
    let h = buffer.height();
    let mut plane = Array2::<f32>::zeros((h, band.width()));
    for (y, mut out) in plane.outer_iter_mut().enumerate() {
        let row = buffer.row(y);
        for (o, x) in out.iter_mut().zip(band.columns()) {
            let i = x * RGBA_CHANNELS;
            *o = brightness(row[i], row[i + 1], row[i + 2]);
        }
    }
    plane
}

/// Compute one [`RowStatistic`] per row in `rows` over the columns of `band`.
///
/// Rows 0 and `height - 1` get zero edge and transition intensity since they
/// lack a neighbour on one side. Rows outside the image are dropped and the
/// band is clipped to the image width.
pub fn sample_rows(
    buffer: &PixelBuffer,
    band: ColumnBand,
    rows: Range<usize>,
    config: &SamplerConfig,
) -> RowProfile {
    let band = band.clip(buffer.width());
    let h = buffer.height();
    let rows = rows.start.min(h)..rows.end.min(h);
    let plane = brightness_plane(buffer, band);

    let stats: Vec<RowStatistic> = if band.width() * rows.len() >= PARALLEL_PIXEL_THRESHOLD {
        rows.clone()
            .into_par_iter()
            .map(|y| row_statistic(buffer, &plane, band, y, config))
            .collect()
    } else {
        rows.clone()
            .map(|y| row_statistic(buffer, &plane, band, y, config))
            .collect()
    };

    RowProfile::new(rows.start, band, stats)
}

/// Sample every row of the image.
pub fn sample_all_rows(
    buffer: &PixelBuffer,
    band: ColumnBand,
    config: &SamplerConfig,
) -> RowProfile {
    sample_rows(buffer, band, 0..buffer.height(), config)
}

fn row_statistic(
    buffer: &PixelBuffer,
    plane: &Array2<f32>,
    band: ColumnBand,
    y: usize,
    config: &SamplerConfig,
) -> RowStatistic {
    let n = band.width() as f32;
    let pixels = buffer.row(y);
    let dark_limit = config.darkness_threshold;

    let mut dark = 0usize;
    let mut sum = [0.0f64; 3];
    for x in band.columns() {
        let i = x * RGBA_CHANNELS;
        let (r, g, b) = (pixels[i], pixels[i + 1], pixels[i + 2]);
        if r < dark_limit && g < dark_limit && b < dark_limit {
            dark += 1;
        }
        sum[0] += r as f64;
        sum[1] += g as f64;
        sum[2] += b as f64;
    }

    let current = plane.row(y);
    let mean_brightness = current.iter().map(|&v| v as f64).sum::<f64>() / n as f64;

    let (edges, transitions) = if y == 0 || y + 1 >= plane.nrows() {
        (0, 0)
    } else {
        count_edges(plane.row(y - 1), current, plane.row(y + 1), config)
    };

    RowStatistic {
        dark_ratio: dark as f32 / n,
        edge_intensity: edges as f32 / n,
        transition_intensity: transitions as f32 / n,
        brightness: mean_brightness as f32,
        red: (sum[0] / n as f64) as f32,
        green: (sum[1] / n as f64) as f32,
        blue: (sum[2] / n as f64) as f32,
    }
}

/// Count edge and transition pixels of a row given its vertical neighbours.
fn count_edges(
    above: ArrayView1<f32>,
    current: ArrayView1<f32>,
    below: ArrayView1<f32>,
    config: &SamplerConfig,
) -> (usize, usize) {
    let mut edges = 0;
    let mut transitions = 0;

    for ((&a, &c), &b) in above.iter().zip(current.iter()).zip(below.iter()) {
        let gradient = (c - a).abs() + (c - b).abs();
        let deviation = (c - (a + b) * 0.5).abs();
        if gradient > config.edge_threshold || deviation > config.edge_deviation_threshold {
            edges += 1;
        }
        if (a - b).abs() > config.transition_threshold {
            transitions += 1;
        }
    }

    (edges, transitions)
}
