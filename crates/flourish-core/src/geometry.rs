//! Surface bounds.

/// Size of a drawing surface in surface units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Whether `(x, y)` lies inside the bounds grown by `margin` on every side.
    pub fn contains_with_margin(&self, x: f32, y: f32, margin: f32) -> bool {
        (-margin..=self.width + margin).contains(&x)
            && (-margin..=self.height + margin).contains(&y)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}
