#![allow(dead_code)]

use std::ops::Range;

use stoutline_core::AnalyzerConfig;
use stoutline_core::Analyzer;

/// Opaque RGBA buffer filled row-band by row-band with gray levels.
///
/// Rows not covered by any band stay black.
pub fn gray_rows(width: usize, height: usize, bands: &[(Range<usize>, u8)]) -> Vec<u8> {
    let mut data = vec![0u8; width * height * 4];
    for px in data.chunks_exact_mut(4) {
        px[3] = 255;
    }
    for (rows, gray) in bands {
        for y in rows.clone() {
            paint_segment(&mut data, width, y, 0..width, *gray);
        }
    }
    data
}

/// Paint columns `xs` of row `y` with a gray level.
pub fn paint_segment(data: &mut [u8], width: usize, y: usize, xs: Range<usize>, gray: u8) {
    for x in xs {
        let i = (y * width + x) * 4;
        data[i] = gray;
        data[i + 1] = gray;
        data[i + 2] = gray;
        data[i + 3] = 255;
    }
}

/// Light (`top`) above `split`, dark (`bottom`) from `split` down.
pub fn step_buffer(width: usize, height: usize, split: usize, top: u8, bottom: u8) -> Vec<u8> {
    gray_rows(width, height, &[(0..split, top), (split..height, bottom)])
}

/// 640x480 capture: bright gray 200 for rows 0-119, near-black 20 below.
pub fn reference_capture() -> Vec<u8> {
    step_buffer(640, 480, 120, 200, 20)
}

/// 640x480 glass: background, a bright rim line at row 60, light foam,
/// dark stout from row 150, a bright base line at row 400 and a table below.
pub fn glass_capture() -> Vec<u8> {
    gray_rows(
        640,
        480,
        &[
            (0..60, 128),
            (60..61, 255),
            (61..150, 230),
            (150..400, 20),
            (400..401, 255),
            (401..480, 100),
        ],
    )
}

/// Like [`glass_capture`] without foam, with the rim line at row 50 on the
/// left half of the image and at row 70 on the right half.
pub fn tilted_rim_capture() -> Vec<u8> {
    let mut data = gray_rows(
        640,
        480,
        &[
            (0..150, 128),
            (150..400, 20),
            (400..401, 255),
            (401..480, 100),
        ],
    );
    paint_segment(&mut data, 640, 50, 0..320, 255);
    paint_segment(&mut data, 640, 70, 320..640, 255);
    data
}

pub fn default_analyzer() -> Analyzer {
    Analyzer::new(AnalyzerConfig::default()).expect("default config is valid")
}

/// Small deterministic generator for noise buffers.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        (0..len).map(|_| self.next_u64() as u8).collect()
    }
}
