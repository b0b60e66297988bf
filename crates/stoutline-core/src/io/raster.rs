use image::{Rgba, RgbaImage};

use crate::overlay::{Canvas, Color, DrawCommand};

/// Length of the end ticks on a bracket.
const BRACKET_TICK: u32 = 4;

/// Source-over blend of one channel, `alpha` in 0-255.
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let mixed = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((mixed + 1 + (mixed >> 8)) >> 8) as u8
}

fn blend_pixel(image: &mut RgbaImage, x: u32, y: u32, color: Color) {
    if x >= image.width() || y >= image.height() {
        return;
    }
    let alpha = color[3] as u16;
    let dst = image.get_pixel_mut(x, y);
    let Rgba([r, g, b, a]) = *dst;
    *dst = Rgba([
        blend_channel(color[0], r, alpha),
        blend_channel(color[1], g, alpha),
        blend_channel(color[2], b, alpha),
        a.max(color[3]),
    ]);
}

fn hline(image: &mut RgbaImage, y: u32, x0: u32, x1: u32, color: Color) {
    for x in x0..x1.min(image.width()) {
        blend_pixel(image, x, y, color);
    }
}

fn vline(image: &mut RgbaImage, x: u32, y0: u32, y1: u32, color: Color) {
    let (top, bottom) = (y0.min(y1), y0.max(y1));
    for y in top..=bottom.min(image.height().saturating_sub(1)) {
        blend_pixel(image, x, y, color);
    }
}

/// Raster painter. Text labels are not rasterised: there is no font to draw
/// them with, so callers print label text alongside the image.
impl Canvas for RgbaImage {
    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::HorizontalLine {
                y,
                x0,
                x1,
                width,
                color,
                ..
            } => {
                let first = y.saturating_sub(width / 2);
                for row in first..first + (*width).max(1) {
                    hline(self, row, *x0, *x1, *color);
                }
            }
            DrawCommand::RowMarker {
                y,
                x,
                length,
                color,
            } => hline(self, *y, *x, x + length, *color),
            DrawCommand::Bracket { x, y0, y1, color } => {
                vline(self, *x, *y0, *y1, *color);
                hline(self, *y0, *x, x + BRACKET_TICK, *color);
                hline(self, *y1, *x, x + BRACKET_TICK, *color);
            }
            DrawCommand::Label { .. } => {}
            DrawCommand::TargetGlyph { x, y, size, color } => {
                // Columns shrink toward the tip at (x, y).
                for i in 0..*size {
                    let Some(col) = x.checked_sub(size - i) else {
                        continue;
                    };
                    let half = size - i;
                    vline(self, col, y.saturating_sub(half), y + half, *color);
                }
                blend_pixel(self, *x, *y, *color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_line_overwrites_pixels() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        img.draw(&DrawCommand::HorizontalLine {
            role: crate::overlay::LineRole::Level,
            y: 5,
            x0: 2,
            x1: 6,
            width: 1,
            color: [255, 0, 0, 255],
        });
        assert_eq!(img.get_pixel(2, 5).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(6, 5).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(3, 4).0, [0, 0, 0, 255]);
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut img = RgbaImage::new(4, 4);
        img.draw(&DrawCommand::Bracket {
            x: 3,
            y0: 1,
            y1: 40,
            color: [255, 255, 255, 255],
        });
        img.draw(&DrawCommand::TargetGlyph {
            x: 1,
            y: 1,
            size: 8,
            color: [0, 255, 0, 255],
        });
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255, 255]);
    }
}
