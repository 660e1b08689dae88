//! Drawing surfaces.
//!
//! The renderer draws through the [`Surface`] trait in surface units. The
//! terminal implementation, [`CellSurface`], rasterizes into a grid of
//! terminal cells where each cell spans `scale.x × scale.y` units, then
//! paints itself into a ratatui [`Buffer`] as a ratatui [`Widget`].

use flourish_core::{Bounds, Rgb};
use glam::Vec2;
use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::chars::density_char;

/// Color plus alpha for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Rgb,
    pub alpha: f32,
}

impl Paint {
    pub fn new(color: Rgb, alpha: f32) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }
}

/// Primitive drawing operations needed by the renderer.
pub trait Surface {
    /// Drawable area in surface units.
    fn bounds(&self) -> Bounds;

    /// Erase everything drawn so far.
    fn clear(&mut self);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, paint: Paint);

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint);

    /// Disc fading linearly from `paint.alpha` at the center to nothing at `radius`.
    fn radial_glow(&mut self, center: Vec2, radius: f32, paint: Paint);

    /// Stroke a closed polygon through `points`.
    fn stroke_polygon(&mut self, points: &[Vec2], paint: Paint) {
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.stroke_line(from, to, paint);
        }
    }
}

/// Blended color of one terminal cell, premultiplied over black.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Texel {
    rgb: [f32; 3],
    coverage: f32,
}

impl Texel {
    fn blend(&mut self, paint: Paint) {
        let a = paint.alpha;
        let src = paint.color.channels();
        for (dst, src) in self.rgb.iter_mut().zip(src) {
            *dst = *dst * (1.0 - a) + src * a;
        }
        self.coverage = self.coverage * (1.0 - a) + a;
    }

    fn tint(&self) -> Rgb {
        if self.coverage <= 0.0 {
            return Rgb::BLACK;
        }
        Rgb::from_channels(self.rgb.map(|c| c / self.coverage))
    }
}

/// A surface covering a rectangle of the terminal.
#[derive(Debug, Clone)]
pub struct CellSurface {
    /// Terminal cells covered by this surface.
    area: Rect,
    /// Surface units per column and per row.
    scale: Vec2,
    /// Layer opacity applied when compositing into the terminal buffer.
    opacity: f32,
    /// Detached surfaces are blank and draw nothing.
    attached: bool,
    texels: Vec<Texel>,
}

impl CellSurface {
    /// Create a surface over `area` with `scale` units per cell.
    pub fn new(area: Rect, scale: Vec2) -> Self {
        Self {
            area,
            scale: scale.max(Vec2::splat(f32::EPSILON)),
            opacity: 1.0,
            attached: true,
            texels: vec![Texel::default(); area.area() as usize],
        }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Follow the host container to a new rectangle. Drawn content is discarded.
    pub fn resize(&mut self, area: Rect) {
        if area == self.area {
            return;
        }
        self.area = area;
        self.texels = vec![Texel::default(); area.area() as usize];
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Blank the surface and stop it from drawing until [`attach`](Self::attach).
    pub fn detach(&mut self) {
        self.clear();
        self.attached = false;
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Convert a terminal cell to the surface-local coordinate of its center.
    pub fn to_local(&self, column: u16, row: u16) -> Vec2 {
        Vec2::new(
            (column as f32 - self.area.x as f32 + 0.5) * self.scale.x,
            (row as f32 - self.area.y as f32 + 0.5) * self.scale.y,
        )
    }

    /// Blended coverage of the cell at local `(column, row)`.
    pub fn coverage(&self, column: u16, row: u16) -> f32 {
        self.texel(column, row).map_or(0.0, |t| t.coverage)
    }

    /// Blended color of the cell at local `(column, row)`, if anything was drawn there.
    pub fn tint(&self, column: u16, row: u16) -> Option<Rgb> {
        self.texel(column, row)
            .filter(|t| t.coverage > 0.0)
            .map(Texel::tint)
    }

    fn texel(&self, column: u16, row: u16) -> Option<&Texel> {
        if column >= self.area.width || row >= self.area.height {
            return None;
        }
        self.texels
            .get(row as usize * self.area.width as usize + column as usize)
    }

    /// Index of the cell containing `point`, if it is on the surface.
    fn index_of(&self, point: Vec2) -> Option<usize> {
        let cell = (point / self.scale).floor();
        if !cell.is_finite()
            || cell.x < 0.0
            || cell.y < 0.0
            || cell.x >= self.area.width as f32
            || cell.y >= self.area.height as f32
        {
            return None;
        }
        Some(cell.y as usize * self.area.width as usize + cell.x as usize)
    }

    fn cell_center(&self, column: usize, row: usize) -> Vec2 {
        Vec2::new(column as f32 + 0.5, row as f32 + 0.5) * self.scale
    }

    /// Visit every cell whose center is within `radius` of `center`.
    fn cells_within(&self, center: Vec2, radius: f32) -> Vec<(usize, f32)> {
        if self.area.is_empty() || !center.is_finite() || !radius.is_finite() {
            return Vec::new();
        }
        let max_col = self.area.width as f32 - 1.0;
        let max_row = self.area.height as f32 - 1.0;
        let lo = ((center - radius) / self.scale).floor();
        let hi = ((center + radius) / self.scale).floor();
        if hi.x < 0.0 || hi.y < 0.0 || lo.x > max_col || lo.y > max_row {
            return Vec::new();
        }
        let (c0, c1) = (lo.x.max(0.0) as usize, hi.x.min(max_col) as usize);
        let (r0, r1) = (lo.y.max(0.0) as usize, hi.y.min(max_row) as usize);

        let mut cells = Vec::new();
        for row in r0..=r1 {
            for col in c0..=c1 {
                let d = self.cell_center(col, row).distance(center);
                if d <= radius {
                    cells.push((row * self.area.width as usize + col, d));
                }
            }
        }
        cells
    }
}

/// Part of the segment `from..to` inside `bounds` (Liang-Barsky), if any.
fn clip_segment(from: Vec2, to: Vec2, bounds: Bounds) -> Option<(Vec2, Vec2)> {
    if !from.is_finite() || !to.is_finite() {
        return None;
    }
    let delta = to - from;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    let edges = [
        (-delta.x, from.x),
        (delta.x, bounds.width - from.x),
        (-delta.y, from.y),
        (delta.y, bounds.height - from.y),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((from + delta * t0, from + delta * t1))
}

impl Surface for CellSurface {
    fn bounds(&self) -> Bounds {
        Bounds::new(
            self.area.width as f32 * self.scale.x,
            self.area.height as f32 * self.scale.y,
        )
    }

    fn clear(&mut self) {
        self.texels.fill(Texel::default());
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, paint: Paint) {
        // Only the visible part is sampled, so the step count stays bounded
        // by the surface size however long the line is.
        let Some((from, to)) = clip_segment(from, to, self.bounds()) else {
            return;
        };
        let length = from.distance(to);
        let spacing = self.scale.min_element() * 0.5;
        let steps = (length / spacing).ceil().max(1.0) as usize;
        let mut last = None;
        for i in 0..=steps {
            let point = from.lerp(to, i as f32 / steps as f32);
            let Some(idx) = self.index_of(point) else {
                continue;
            };
            if last == Some(idx) {
                continue;
            }
            last = Some(idx);
            self.texels[idx].blend(paint);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        let mut hit_center = false;
        let center_idx = self.index_of(center);
        for (idx, _) in self.cells_within(center, radius) {
            hit_center |= Some(idx) == center_idx;
            self.texels[idx].blend(paint);
        }
        // Circles smaller than a cell still mark the cell they sit in.
        if !hit_center && let Some(idx) = center_idx {
            self.texels[idx].blend(paint);
        }
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, paint: Paint) {
        if radius <= 0.0 {
            return;
        }
        for (idx, d) in self.cells_within(center, radius) {
            let falloff = Paint::new(paint.color, paint.alpha * (1.0 - d / radius));
            self.texels[idx].blend(falloff);
        }
    }
}

impl Widget for &CellSurface {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.attached {
            return;
        }
        let visible = self.area.intersection(area);
        for y in visible.top()..visible.bottom() {
            for x in visible.left()..visible.right() {
                let (col, row) = (x - self.area.x, y - self.area.y);
                let Some(texel) = self.texel(col, row) else {
                    continue;
                };
                let Some(ch) = density_char(texel.coverage * self.opacity) else {
                    continue;
                };
                let Rgb(r, g, b) = texel.tint();
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(ch).set_fg(Color::Rgb(r, g, b));
                }
            }
        }
    }
}

/// Draw call captured by [`RecordingSurface`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Clear,
    Line { from: Vec2, to: Vec2, paint: Paint },
    Circle { center: Vec2, radius: f32, paint: Paint },
    Glow { center: Vec2, radius: f32, paint: Paint },
}

/// Surface that records draw calls instead of rasterizing them.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingSurface {
    pub bounds: Bounds,
    pub ops: Vec<DrawOp>,
}

#[cfg(test)]
impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            bounds: Bounds::new(width, height),
            ops: Vec::new(),
        }
    }

    pub fn lines(&self) -> Vec<(Vec2, Vec2, Paint)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Line { from, to, paint } => Some((*from, *to, *paint)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl Surface for RecordingSurface {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2, paint: Paint) {
        self.ops.push(DrawOp::Line { from, to, paint });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            paint,
        });
    }

    fn radial_glow(&mut self, center: Vec2, radius: f32, paint: Paint) {
        self.ops.push(DrawOp::Glow {
            center,
            radius,
            paint,
        });
    }
}
