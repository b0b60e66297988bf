use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::scoring::ScoreResult;

/// RGBA colour.
pub type Color = [u8; 4];

/// Which glass line a horizontal line marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LineRole {
    Rim,
    Base,
    Level,
    Target,
}

/// One primitive for a drawing surface. Coordinates are image pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Horizontal line from `x0` (inclusive) to `x1` (exclusive), `width` rows thick.
    HorizontalLine {
        role: LineRole,
        y: u32,
        x0: u32,
        x1: u32,
        width: u32,
        color: Color,
    },
    /// Per-row intensity tick along the side strip; `length` scales with edge intensity.
    RowMarker {
        y: u32,
        x: u32,
        length: u32,
        color: Color,
    },
    /// Vertical bracket from `y0` to `y1` (inclusive) with short ticks at both ends.
    Bracket {
        x: u32,
        y0: u32,
        y1: u32,
        color: Color,
    },
    Label {
        x: u32,
        y: u32,
        text: String,
        color: Color,
    },
    /// Right-pointing triangle whose tip sits on `(x, y)`.
    TargetGlyph {
        x: u32,
        y: u32,
        size: u32,
        color: Color,
    },
}

/// Colours and sizes of the overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub rim_color: Color,
    pub base_color: Color,
    pub level_color: Color,
    pub target_color: Color,
    pub marker_color: Color,
    pub bracket_color: Color,
    pub text_color: Color,
    pub line_width: u32,
    /// Marker length for an edge intensity of 1.0.
    pub marker_length: u32,
    /// Gap between the band and the marker strip or brackets.
    pub margin: u32,
    pub glyph_size: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            rim_color: [255, 255, 0, 255],
            base_color: [255, 255, 0, 255],
            level_color: [0, 200, 255, 255],
            target_color: [0, 255, 0, 255],
            marker_color: [255, 0, 255, 180],
            bracket_color: [255, 255, 255, 220],
            text_color: [255, 255, 255, 255],
            line_width: 2,
            marker_length: 24,
            margin: 6,
            glyph_size: 8,
        }
    }
}

/// A surface that can replay draw commands.
pub trait Canvas {
    fn draw(&mut self, command: &DrawCommand);
}

/// Replay `commands` in order.
pub fn render<C: Canvas + ?Sized>(commands: &[DrawCommand], canvas: &mut C) {
    for command in commands {
        canvas.draw(command);
    }
}

/// Build the display list for an analysis and its score.
///
/// Lines span the sampled band; intensity markers run along its right edge;
/// brackets with percentages for the empty and filled parts sit to its left.
pub fn build_overlay(
    analysis: &AnalysisResult,
    score: &ScoreResult,
    style: &OverlayStyle,
) -> Vec<DrawCommand> {
    let band = analysis.band();
    let g = &analysis.geometry;
    let max_x = analysis.width.saturating_sub(1) as u32;
    let x0 = band.start_x as u32;
    let x1 = band.end_x as u32;
    let mut commands = Vec::new();

    let line = |role, row: usize, color| DrawCommand::HorizontalLine {
        role,
        y: row as u32,
        x0,
        x1,
        width: style.line_width,
        color,
    };
    commands.push(line(LineRole::Rim, g.rim_top, style.rim_color));
    commands.push(line(LineRole::Base, g.base_bottom, style.base_color));
    commands.push(line(LineRole::Target, score.target_row, style.target_color));
    commands.push(line(LineRole::Level, g.liquid_level, style.level_color));

    let strip_x = (x1 + style.margin).min(max_x);
    for (row, stat) in analysis.row_stats.rows() {
        if stat.edge_intensity <= 0.0 {
            continue;
        }
        let length = ((stat.edge_intensity * style.marker_length as f32).ceil() as u32).max(1);
        commands.push(DrawCommand::RowMarker {
            y: row as u32,
            x: strip_x,
            length,
            color: style.marker_color,
        });
    }

    let bracket_x = x0.saturating_sub(style.margin);
    let label_x = bracket_x.saturating_sub(style.margin * 6);
    let empty_ratio = 1.0 - analysis.fill_ratio;
    for (top, bottom, text) in [
        (
            g.rim_top,
            g.liquid_level,
            format!("{:.0}%", empty_ratio * 100.0),
        ),
        (
            g.liquid_level,
            g.base_bottom,
            format!("{:.0}%", analysis.fill_ratio * 100.0),
        ),
    ] {
        commands.push(DrawCommand::Bracket {
            x: bracket_x,
            y0: top as u32,
            y1: bottom as u32,
            color: style.bracket_color,
        });
        commands.push(DrawCommand::Label {
            x: label_x,
            y: ((top + bottom) / 2) as u32,
            text,
            color: style.text_color,
        });
    }

    commands.push(DrawCommand::TargetGlyph {
        x: x0,
        y: score.target_row as u32,
        size: style.glyph_size,
        color: style.target_color,
    });

    let mut headline = format!("{:.2} - {}", score.score, score.feedback);
    if let Some(hint) = score.hint {
        headline.push_str(&format!(" ({hint})"));
    }
    if analysis.low_confidence {
        headline.push_str(" [low confidence]");
    }
    commands.push(DrawCommand::Label {
        x: style.margin,
        y: style.margin,
        text: headline,
        color: style.text_color,
    });

    commands
}
