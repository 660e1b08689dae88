//! Animated entities.

use flourish_core::{Bounds, Rgb, ShapeKind};
use glam::Vec2;
use rand::Rng;

/// What an entity looks like when rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Silhouette {
    Shape(ShapeKind),
    Particle,
}

/// Rotation state of a shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub angle: f32,
    /// Radians per frame.
    pub rate: f32,
}

/// Life cycle of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Life {
    /// Remaining fraction, in (0, 1] after every tick.
    pub remaining: f32,
    /// Frames from a full life to respawn.
    pub max: f32,
}

impl Life {
    pub fn new(max: f32) -> Self {
        Self {
            remaining: 1.0,
            max: max.max(1.0),
        }
    }
}

/// One animated element of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Velocity drawn at creation; relaxation pulls `velocity` back toward it.
    pub baseline: Vec2,
    pub size: f32,
    pub phase: f32,
    pub phase_rate: f32,
    pub spin: Option<Spin>,
    pub opacity: f32,
    pub life: Option<Life>,
    pub color: Rgb,
    pub silhouette: Silhouette,
}

impl Entity {
    /// A bare particle at `position` moving with `velocity`, mostly for tests
    /// and hand-built fields.
    pub fn particle(position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity,
            baseline: velocity,
            size,
            phase: 0.0,
            phase_rate: 0.0,
            spin: None,
            opacity: 1.0,
            life: None,
            color: Rgb::WHITE,
            silhouette: Silhouette::Particle,
        }
    }

    /// A bare shape at `position` moving with `velocity`.
    pub fn shape(kind: ShapeKind, position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            spin: Some(Spin {
                angle: 0.0,
                rate: 0.0,
            }),
            silhouette: Silhouette::Shape(kind),
            ..Self::particle(position, velocity, size)
        }
    }

    /// Size and alpha multiplier for the current pulse phase.
    pub fn pulse(&self, amplitude: f32) -> f32 {
        1.0 + self.phase.sin() * amplitude
    }

    /// Life fraction, 1.0 for entities without a life cycle.
    pub fn life_fraction(&self) -> f32 {
        self.life.map_or(1.0, |l| l.remaining)
    }

    /// Recycle the entity in place: new random position, full life.
    pub fn respawn<R: Rng + ?Sized>(&mut self, bounds: Bounds, rng: &mut R) {
        self.position = random_point(bounds, rng);
        if let Some(life) = self.life.as_mut() {
            life.remaining = 1.0;
        }
    }

    /// Re-inject the entity at the opposite edge once it drifts more than
    /// `size` past one. Each axis is handled independently.
    pub fn wrap(&mut self, bounds: Bounds) {
        let margin = self.size;
        self.position.x = wrap_axis(self.position.x, bounds.width, margin);
        self.position.y = wrap_axis(self.position.y, bounds.height, margin);
    }
}

fn wrap_axis(value: f32, extent: f32, margin: f32) -> f32 {
    if value < -margin {
        extent + margin
    } else if value > extent + margin {
        -margin
    } else {
        value
    }
}

/// Uniform point in `[0, width) × [0, height)`; zero on empty axes.
pub fn random_point<R: Rng + ?Sized>(bounds: Bounds, rng: &mut R) -> Vec2 {
    let x = if bounds.width > 0.0 {
        rng.gen_range(0.0..bounds.width)
    } else {
        0.0
    };
    let y = if bounds.height > 0.0 {
        rng.gen_range(0.0..bounds.height)
    } else {
        0.0
    };
    Vec2::new(x, y)
}
