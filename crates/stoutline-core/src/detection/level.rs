use std::ops::Range;

use crate::sampler::{RowProfile, RowStatistic};

/// A candidate liquid line and the score it was accepted with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelEstimate {
    pub row: usize,
    pub strength: f32,
}

/// Channel sums of a run of rows: dark ratio, brightness, red, green, blue.
type Channels = [f64; 5];

/// Prefix sums over a contiguous row span, for O(1) window means.
struct WindowMeans {
    first_row: usize,
    prefix: Vec<Channels>,
}

impl WindowMeans {
    fn new(profile: &RowProfile, span: Range<usize>) -> Self {
        let mut prefix = Vec::with_capacity(span.len() + 1);
        let mut acc: Channels = [0.0; 5];
        prefix.push(acc);
        for row in span.clone() {
            let s = profile.get(row).copied().unwrap_or_default();
            for (a, v) in acc.iter_mut().zip(channels(&s)) {
                *a += v;
            }
            prefix.push(acc);
        }
        Self {
            first_row: span.start,
            prefix,
        }
    }

    /// Mean channels of rows `[start, end)`. The range must lie inside the span.
    fn mean(&self, start: usize, end: usize) -> Channels {
        let lo = &self.prefix[start - self.first_row];
        let hi = &self.prefix[end - self.first_row];
        let n = (end - start) as f64;
        let mut out = [0.0; 5];
        for (o, (h, l)) in out.iter_mut().zip(hi.iter().zip(lo)) {
            *o = (h - l) / n;
        }
        out
    }
}

fn channels(s: &RowStatistic) -> Channels {
    [
        s.dark_ratio as f64,
        s.brightness as f64,
        s.red as f64,
        s.green as f64,
        s.blue as f64,
    ]
}

/// Rows `y` for which both `[y - window, y)` and `[y, y + window)` fit in `span`.
fn window_positions(span: &Range<usize>, window: usize) -> Option<Range<usize>> {
    if window == 0 || span.len() < 2 * window {
        return None;
    }
    Some(span.start + window..span.end - window + 1)
}

/// Liquid line at the strongest dark-ratio contrast between the `window` rows
/// above a row and the `window` rows from it downward.
///
/// The whole span is scanned top-down and the global maximum kept (first one on
/// ties). Returns `None` when the best contrast is below `min_contrast`.
pub fn sliding_contrast_level(
    profile: &RowProfile,
    span: Range<usize>,
    window: usize,
    min_contrast: f32,
) -> Option<LevelEstimate> {
    let span = profile.clip(span);
    let positions = window_positions(&span, window)?;
    let means = WindowMeans::new(profile, span);

    let mut best: Option<LevelEstimate> = None;
    for y in positions {
        let above = means.mean(y - window, y)[0];
        let below = means.mean(y, y + window)[0];
        let contrast = (above - below).abs() as f32;
        if best.map_or(true, |b| contrast > b.strength) {
            best = Some(LevelEstimate {
                row: y,
                strength: contrast,
            });
        }
    }

    best.filter(|b| b.strength >= min_contrast)
}

/// Liquid line found by scanning from the base upward and comparing the mean
/// colour of the `window` rows at each position with the `window` rows above.
///
/// The score is the summed absolute difference of brightness, red, green and
/// blue. A row is accepted only if it beats `min_difference` and every row
/// accepted below it.
pub fn color_difference_level(
    profile: &RowProfile,
    span: Range<usize>,
    window: usize,
    min_difference: f32,
) -> Option<LevelEstimate> {
    let span = profile.clip(span);
    let positions = window_positions(&span, window)?;
    let means = WindowMeans::new(profile, span);

    let mut best: Option<LevelEstimate> = None;
    for y in positions.rev() {
        let here = means.mean(y, y + window);
        let above = means.mean(y - window, y);
        let difference: f64 = (1..5).map(|c| (here[c] - above[c]).abs()).sum();
        let difference = difference as f32;

        if difference > min_difference && best.map_or(true, |b| difference > b.strength) {
            best = Some(LevelEstimate {
                row: y,
                strength: difference,
            });
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColumnBand;

    /// Rows `< split` bright and clear, rows `>= split` dark.
    fn step_profile(height: usize, split: usize) -> RowProfile {
        let stats = (0..height)
            .map(|row| {
                if row < split {
                    RowStatistic {
                        brightness: 200.0,
                        red: 200.0,
                        green: 200.0,
                        blue: 200.0,
                        ..Default::default()
                    }
                } else {
                    RowStatistic {
                        dark_ratio: 1.0,
                        brightness: 20.0,
                        red: 20.0,
                        green: 20.0,
                        blue: 20.0,
                        ..Default::default()
                    }
                }
            })
            .collect();
        RowProfile::new(0, ColumnBand::full(4), stats)
    }

    #[test]
    fn sliding_contrast_finds_step() {
        let profile = step_profile(200, 80);
        let level = sliding_contrast_level(&profile, 10..180, 5, 0.3).unwrap();
        assert_eq!(level.row, 80);
        assert!((level.strength - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sliding_contrast_rejects_flat_profile() {
        let profile = step_profile(200, 0);
        assert!(sliding_contrast_level(&profile, 10..180, 5, 0.3).is_none());
    }

    #[test]
    fn color_difference_finds_step() {
        let profile = step_profile(200, 80);
        let level = color_difference_level(&profile, 10..180, 5, 30.0).unwrap();
        assert_eq!(level.row, 80);
        assert!((level.strength - 720.0).abs() < 1e-3);
    }

    #[test]
    fn span_shorter_than_two_windows_yields_nothing() {
        let profile = step_profile(200, 80);
        assert!(sliding_contrast_level(&profile, 75..84, 5, 0.3).is_none());
    }
}
