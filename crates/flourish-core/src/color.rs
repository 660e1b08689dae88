//! Color templates used by the fields.

use serde::{Deserialize, Serialize};

/// An opaque sRGB color. Alpha is supplied separately at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Channels as floats in 0.0-255.0.
    pub fn channels(self) -> [f32; 3] {
        [self.0 as f32, self.1 as f32, self.2 as f32]
    }

    /// Build a color from float channels, clamping each to 0-255.
    pub fn from_channels(c: [f32; 3]) -> Self {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Rgb(q(c[0]), q(c[1]), q(c[2]))
    }
}

/// Indigo, orchid, violet, emerald and amber.
pub const DEFAULT_PALETTE: &[Rgb] = &[
    Rgb(102, 126, 234),
    Rgb(240, 147, 251),
    Rgb(118, 75, 162),
    Rgb(52, 211, 153),
    Rgb(251, 191, 36),
];

/// Monochrome palette of the ambient field.
pub const AMBIENT_PALETTE: &[Rgb] = &[Rgb::WHITE];
