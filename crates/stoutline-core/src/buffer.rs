use std::ops::Range;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::consts::RGBA_CHANNELS;
use crate::error::{Result, StoutError};

/// Read-only view over an 8-bit RGBA capture, row-major.
///
/// The bytes stay owned by whoever produced the capture; analysis only borrows them.
#[derive(Clone, Copy, Debug)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap `data` as a `width x height` RGBA buffer.
    ///
    /// Fails with [`StoutError::InvalidInput`] when the buffer is empty or its
    /// length does not match `width * height * 4`.
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        if data.is_empty() || width == 0 || height == 0 {
            return Err(StoutError::InvalidInput(format!(
                "empty pixel buffer ({width}x{height}, {} bytes)",
                data.len()
            )));
        }

        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(RGBA_CHANNELS))
            .ok_or_else(|| {
                StoutError::InvalidInput(format!("{width}x{height} overflows buffer size"))
            })?;

        if data.len() != expected {
            return Err(StoutError::InvalidInput(format!(
                "buffer holds {} bytes, expected {expected} for {width}x{height} RGBA",
                data.len()
            )));
        }

        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn from_image(image: &'a RgbaImage) -> Result<Self> {
        Self::new(
            image.as_raw(),
            image.width() as usize,
            image.height() as usize,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// RGBA bytes of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub(crate) fn row(&self, y: usize) -> &'a [u8] {
        let stride = self.width * RGBA_CHANNELS;
        &self.data[y * stride..(y + 1) * stride]
    }
}

/// Half-open column range `[start_x, end_x)` that the sampler scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBand {
    pub start_x: usize,
    pub end_x: usize,
}

impl ColumnBand {
    /// Build a band from width fractions. The band is never empty and never
    /// extends past `width`.
    pub fn from_fractions(width: usize, start: f32, end: f32) -> Self {
        let start_x = fraction_to_index(start, width).min(width.saturating_sub(1));
        let end_x = fraction_to_index(end, width).clamp(start_x + 1, width.max(start_x + 1));
        Self { start_x, end_x }
    }

    pub fn full(width: usize) -> Self {
        Self {
            start_x: 0,
            end_x: width,
        }
    }

    pub fn width(&self) -> usize {
        self.end_x.saturating_sub(self.start_x)
    }

    /// Restrict the band to the columns of a `width`-wide image. A band lying
    /// wholly outside keeps the last column so the result is never empty.
    pub fn clip(&self, width: usize) -> Self {
        let start_x = self.start_x.min(width.saturating_sub(1));
        let end_x = self.end_x.min(width).max(start_x + 1);
        Self { start_x, end_x }
    }

    pub fn columns(&self) -> Range<usize> {
        self.start_x..self.end_x
    }

    /// Split into left and right halves. Returns `None` for bands narrower than two columns.
    pub fn split(&self) -> Option<(ColumnBand, ColumnBand)> {
        if self.width() < 2 {
            return None;
        }
        let mid = self.start_x + self.width() / 2;
        Some((
            ColumnBand {
                start_x: self.start_x,
                end_x: mid,
            },
            ColumnBand {
                start_x: mid,
                end_x: self.end_x,
            },
        ))
    }
}

/// Convert a fraction of `len` to the nearest index, clamped to `[0, len]`.
pub fn fraction_to_index(fraction: f32, len: usize) -> usize {
    let idx = (len as f64 * fraction as f64).round();
    if idx <= 0.0 {
        0
    } else {
        (idx as usize).min(len)
    }
}

/// Row range covered by a `[start, end)` pair of height fractions.
pub fn fraction_span(start: f32, end: f32, height: usize) -> Range<usize> {
    fraction_to_index(start, height)..fraction_to_index(end, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_band_is_middle_third() {
        let band = ColumnBand::from_fractions(640, 1.0 / 3.0, 2.0 / 3.0);
        assert_eq!(band.start_x, 213);
        assert_eq!(band.end_x, 427);
    }

    #[test]
    fn degenerate_band_keeps_one_column() {
        let band = ColumnBand::from_fractions(10, 0.5, 0.5);
        assert_eq!(band.width(), 1);
        assert!(band.split().is_none());
    }

    #[test]
    fn clip_keeps_band_inside_image() {
        let band = ColumnBand { start_x: 5, end_x: 20 };
        assert_eq!(band.clip(10), ColumnBand { start_x: 5, end_x: 10 });

        let outside = ColumnBand { start_x: 12, end_x: 20 };
        assert_eq!(outside.clip(10), ColumnBand { start_x: 9, end_x: 10 });

        let inverted = ColumnBand { start_x: 6, end_x: 2 };
        assert_eq!(inverted.clip(10).width(), 1);
    }

    #[test]
    fn rejects_short_buffer() {
        let data = vec![0u8; 10];
        assert!(PixelBuffer::new(&data, 2, 2).is_err());
    }
}
