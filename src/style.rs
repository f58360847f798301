use serde::Serialize;

use crate::graphic::Graphic;

/// An RGBA color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, alpha dropped.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Segment colors, in assignment order.
pub const PALETTE: [Rgba; 8] = [
    Rgba::new(255, 0, 0, 0.8),     // red
    Rgba::new(0, 255, 0, 0.8),     // green
    Rgba::new(0, 0, 255, 0.8),     // blue
    Rgba::new(255, 255, 0, 0.8),   // yellow
    Rgba::new(255, 0, 255, 0.8),   // magenta
    Rgba::new(0, 255, 255, 0.8),   // cyan
    Rgba::new(255, 165, 0, 0.8),   // orange
    Rgba::new(128, 0, 128, 0.8),   // purple
];

pub const SEGMENT_WIDTH: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineSymbol {
    pub color: Rgba,
    pub width: f32,
    pub style: LineStyle,
}

pub fn palette_color(index: usize) -> Rgba {
    PALETTE[index % PALETTE.len()]
}

/// Give segment `i` the solid line symbol colored `PALETTE[i % 8]`.
pub fn style_segments(segments: &mut [Graphic]) {
    for (index, segment) in segments.iter_mut().enumerate() {
        segment.symbol = Some(LineSymbol {
            color: palette_color(index),
            width: SEGMENT_WIDTH,
            style: LineStyle::Solid,
        });
    }
}
