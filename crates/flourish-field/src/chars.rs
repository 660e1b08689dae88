//! Glyphs used to draw surface cells.

/// Density ramp from faint to solid, indexed by cell coverage.
pub const DENSITY_CHARS: &[char] = &['·', '░', '▒', '▓', '█'];

/// Lower coverage bound of each glyph in [`DENSITY_CHARS`].
pub const DENSITY_THRESHOLDS: &[f32] = &[0.02, 0.08, 0.2, 0.4, 0.6];

/// Glyph for a coverage value, `None` when the cell is too faint to draw.
pub fn density_char(coverage: f32) -> Option<char> {
    DENSITY_THRESHOLDS
        .iter()
        .rposition(|&t| coverage >= t)
        .map(|i| DENSITY_CHARS[i])
}
