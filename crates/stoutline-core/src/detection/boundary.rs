use std::ops::Range;

use crate::sampler::RowProfile;

/// A row whose edge intensity passed the strength threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeCandidate {
    pub row: usize,
    pub strength: f32,
}

/// Rows in `rows` with edge intensity above `min_strength`, strongest first.
/// Equal strengths keep the upper row first.
pub fn rim_candidates(
    profile: &RowProfile,
    rows: Range<usize>,
    min_strength: f32,
) -> Vec<EdgeCandidate> {
    let mut candidates: Vec<EdgeCandidate> = profile
        .clip(rows)
        .filter_map(|row| {
            let strength = profile.get(row)?.edge_intensity;
            (strength > min_strength).then_some(EdgeCandidate { row, strength })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.row.cmp(&b.row))
    });
    candidates
}

/// Topmost of the `keep` strongest edges in the rim window.
///
/// Perspective puts the far rim higher in the frame than the near rim, so the
/// smallest row among the strongest candidates is taken.
pub fn detect_rim(
    profile: &RowProfile,
    rows: Range<usize>,
    min_strength: f32,
    keep: usize,
) -> Option<usize> {
    rim_candidates(profile, rows, min_strength)
        .into_iter()
        .take(keep)
        .map(|c| c.row)
        .min()
}

/// Merge rim rows found in the left and right half-bands.
///
/// `prefer_near_rim` picks the lower row (nearer rim edge), otherwise the
/// topmost row wins. A missing side defers to the other.
pub fn combine_rims(
    left: Option<usize>,
    right: Option<usize>,
    prefer_near_rim: bool,
) -> Option<usize> {
    match (left, right) {
        (Some(l), Some(r)) => Some(if prefer_near_rim { l.max(r) } else { l.min(r) }),
        (side, None) | (None, side) => side,
    }
}

/// Row with the strongest edge in the base window, if it beats `min_strength`.
pub fn detect_base(profile: &RowProfile, rows: Range<usize>, min_strength: f32) -> Option<usize> {
    let mut best: Option<EdgeCandidate> = None;
    for row in profile.clip(rows) {
        let Some(stat) = profile.get(row) else {
            continue;
        };
        if best.map_or(true, |b| stat.edge_intensity > b.strength) {
            best = Some(EdgeCandidate {
                row,
                strength: stat.edge_intensity,
            });
        }
    }

    best.filter(|b| b.strength > min_strength).map(|b| b.row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ColumnBand;
    use crate::sampler::RowStatistic;

    fn profile_with_edges(height: usize, edges: &[(usize, f32)]) -> RowProfile {
        let mut stats = vec![RowStatistic::default(); height];
        for &(row, strength) in edges {
            stats[row].edge_intensity = strength;
        }
        RowProfile::new(0, ColumnBand::full(10), stats)
    }

    #[test]
    fn rim_is_topmost_of_three_strongest() {
        let profile =
            profile_with_edges(100, &[(30, 0.5), (20, 0.2), (40, 0.9), (45, 0.8), (10, 0.1)]);
        // Strongest three: 40, 45, 30. Row 20 is weaker, row 10 below threshold.
        assert_eq!(detect_rim(&profile, 5..50, 0.15, 3), Some(30));
        assert_eq!(detect_rim(&profile, 5..50, 0.15, 4), Some(20));
    }

    #[test]
    fn rim_respects_window() {
        let profile = profile_with_edges(100, &[(60, 0.9)]);
        assert_eq!(detect_rim(&profile, 5..50, 0.15, 3), None);
    }

    #[test]
    fn combine_rim_policies() {
        assert_eq!(combine_rims(Some(30), Some(40), false), Some(30));
        assert_eq!(combine_rims(Some(30), Some(40), true), Some(40));
        assert_eq!(combine_rims(None, Some(40), false), Some(40));
        assert_eq!(combine_rims(Some(30), None, true), Some(30));
        assert_eq!(combine_rims(None, None, true), None);
    }

    #[test]
    fn base_is_argmax_with_first_tie() {
        let profile = profile_with_edges(100, &[(70, 0.4), (80, 0.6), (85, 0.6)]);
        assert_eq!(detect_base(&profile, 60..90, 0.15), Some(80));
    }

    #[test]
    fn weak_base_is_rejected() {
        let profile = profile_with_edges(100, &[(70, 0.1)]);
        assert_eq!(detect_base(&profile, 60..90, 0.15), None);
    }
}
