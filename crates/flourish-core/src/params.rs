//! Tuning parameters for an animated entity field.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::{AMBIENT_PALETTE, DEFAULT_PALETTE, Rgb};

/// Closed interval sampled uniformly when entities are created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A span that always yields `value`.
    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    /// Span symmetric around zero.
    pub const fn symmetric(half_width: f32) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Draw a value uniformly from the span.
    ///
    /// Degenerate or inverted spans return `min` rather than panicking.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Outline silhouettes available to shape fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Square outline, the front face of a cube.
    Cube,
    /// Triangle outline.
    Pyramid,
    /// Circle crossed by latitude and longitude ellipses.
    Ring,
    /// Rhombus outline.
    Diamond,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Cube,
        ShapeKind::Pyramid,
        ShapeKind::Ring,
        ShapeKind::Diamond,
    ];

    /// Position of this kind in [`ShapeKind::ALL`].
    pub const fn index(self) -> usize {
        match self {
            ShapeKind::Cube => 0,
            ShapeKind::Pyramid => 1,
            ShapeKind::Ring => 2,
            ShapeKind::Diamond => 3,
        }
    }

    /// Pick a kind uniformly at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Which variant of the generic field an instance animates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Large rotating outlines.
    Shapes,
    /// Small glowing dots, optionally joined by connection lines.
    #[default]
    Particles,
}

/// Pointer attraction applied to entities within `radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub radius: f32,
    pub strength: f32,
}

/// Pairwise connection lines between nearby particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Pairs closer than this are joined.
    pub distance: f32,
    /// Alpha of a line between two particles at zero distance with full life.
    pub opacity: f32,
    pub color: Rgb,
}

/// Everything needed to populate, step and render one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldParams {
    pub kind: FieldKind,
    pub count: usize,
    pub size: Span,
    /// Range of each velocity component, in units per frame.
    pub speed: Span,
    pub opacity: Span,
    /// Radians added to the pulse phase every frame.
    pub phase_rate: Span,
    /// Peak relative change of size and alpha over a pulse.
    pub pulse_amplitude: f32,
    /// Radians per frame; shapes only.
    pub rotation_rate: Span,
    /// Frames a particle lives before it respawns. `None` disables the life cycle.
    pub lifespan: Option<Span>,
    pub attraction: Option<Attraction>,
    /// Fraction of the gap to the baseline velocity closed every frame.
    pub relaxation: Option<f32>,
    pub connection: Option<Connection>,
    pub palette: Vec<Rgb>,
}

impl FieldParams {
    /// Floating geometric outlines drawn toward the pointer.
    pub fn shapes() -> Self {
        Self {
            kind: FieldKind::Shapes,
            count: 8,
            size: Span::new(20.0, 60.0),
            speed: Span::symmetric(0.3),
            opacity: Span::new(0.1, 0.3),
            phase_rate: Span::new(0.005, 0.015),
            pulse_amplitude: 0.2,
            rotation_rate: Span::symmetric(0.005),
            lifespan: None,
            attraction: Some(Attraction {
                radius: 150.0,
                strength: 0.005,
            }),
            relaxation: None,
            connection: None,
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }

    /// Colored particles with a life cycle, pointer attraction and connections.
    pub fn particles() -> Self {
        Self {
            kind: FieldKind::Particles,
            count: 40,
            size: Span::new(1.0, 4.0),
            speed: Span::symmetric(0.3),
            opacity: Span::new(0.2, 0.7),
            phase_rate: Span::new(0.005, 0.015),
            pulse_amplitude: 0.3,
            rotation_rate: Span::fixed(0.0),
            lifespan: Some(Span::new(100.0, 250.0)),
            attraction: Some(Attraction {
                radius: 100.0,
                strength: 0.015,
            }),
            relaxation: Some(0.05),
            connection: Some(Connection {
                distance: 80.0,
                opacity: 0.2,
                color: Rgb(102, 126, 234),
            }),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }

    /// White drifting particles that ignore the pointer and never die.
    pub fn ambient() -> Self {
        Self {
            kind: FieldKind::Particles,
            count: 50,
            size: Span::new(1.0, 4.0),
            speed: Span::symmetric(0.25),
            opacity: Span::new(0.2, 0.7),
            phase_rate: Span::new(0.005, 0.015),
            pulse_amplitude: 0.3,
            rotation_rate: Span::fixed(0.0),
            lifespan: None,
            attraction: None,
            relaxation: None,
            connection: Some(Connection {
                distance: 100.0,
                opacity: 0.2,
                color: Rgb::WHITE,
            }),
            palette: AMBIENT_PALETTE.to_vec(),
        }
    }

    /// Pick a palette color uniformly, white if the palette is empty.
    pub fn random_color<R: Rng + ?Sized>(&self, rng: &mut R) -> Rgb {
        if self.palette.is_empty() {
            Rgb::WHITE
        } else {
            self.palette[rng.gen_range(0..self.palette.len())]
        }
    }

    /// Initial pulse phase, uniform over a full turn.
    pub fn random_phase<R: Rng + ?Sized>(rng: &mut R) -> f32 {
        rng.gen_range(0.0..TAU)
    }

    /// Names of the spans that are inverted or non-finite.
    pub fn invalid_spans(&self) -> Vec<&'static str> {
        let mut spans = vec![
            ("size", self.size),
            ("speed", self.speed),
            ("opacity", self.opacity),
            ("phase_rate", self.phase_rate),
            ("rotation_rate", self.rotation_rate),
        ];
        if let Some(lifespan) = self.lifespan {
            spans.push(("lifespan", lifespan));
        }
        spans
            .into_iter()
            .filter(|(_, span)| !span.is_valid())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of every setting that would break the field: the invalid spans
    /// plus scalars that are non-finite or out of range.
    pub fn invalid_settings(&self) -> Vec<&'static str> {
        let non_negative = |v: f32| v.is_finite() && v >= 0.0;
        let mut invalid = self.invalid_spans();
        if !self.pulse_amplitude.is_finite() {
            invalid.push("pulse_amplitude");
        }
        if let Some(attraction) = self.attraction {
            if !non_negative(attraction.radius) {
                invalid.push("attraction_radius");
            }
            if !non_negative(attraction.strength) {
                invalid.push("attraction_strength");
            }
        }
        // Rates above one overshoot the baseline every tick.
        if let Some(rate) = self.relaxation
            && !(0.0..=1.0).contains(&rate)
        {
            invalid.push("relaxation");
        }
        if let Some(connection) = self.connection {
            if !non_negative(connection.distance) {
                invalid.push("connection_distance");
            }
            if !non_negative(connection.opacity) {
                invalid.push("connection_opacity");
            }
        }
        invalid
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        Self::particles()
    }
}
