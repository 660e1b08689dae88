//! Rendering of entity fields onto a [`Surface`].

use std::f32::consts::{FRAC_PI_4, TAU};

use flourish_core::{Connection, FieldParams, ShapeKind};
use glam::Vec2;

use crate::entity::{Entity, Silhouette};
use crate::surface::{Paint, Surface};

/// Segments used to approximate ellipses.
const ELLIPSE_SEGMENTS: usize = 24;

/// Paints one outline centered on the origin, rotated by `angle` and moved to `center`.
type ShapePainter = fn(&mut dyn Surface, Vec2, f32, f32, Paint);

/// Outline painters indexed by [`ShapeKind::index`].
const SHAPE_PAINTERS: [ShapePainter; ShapeKind::ALL.len()] =
    [paint_cube, paint_pyramid, paint_ring, paint_diamond];

/// Clear `surface` and draw every entity, plus connection lines when the
/// field has them.
pub fn render(surface: &mut dyn Surface, entities: &[Entity], params: &FieldParams) {
    surface.clear();

    if let Some(connection) = params.connection {
        render_connections(surface, entities, connection);
    }

    for entity in entities {
        let pulse = entity.pulse(params.pulse_amplitude);
        match entity.silhouette {
            Silhouette::Shape(kind) => {
                let angle = entity.spin.map_or(0.0, |s| s.angle);
                let paint = Paint::new(entity.color, entity.opacity * pulse);
                SHAPE_PAINTERS[kind.index()](
                    surface,
                    entity.position,
                    angle,
                    entity.size * pulse,
                    paint,
                );
            }
            Silhouette::Particle => render_particle(surface, entity, pulse),
        }
    }
}

/// Alpha of the line joining two particles `distance` apart, or `None`
/// when they are too far apart to be joined.
pub fn connection_alpha(
    distance: f32,
    threshold: f32,
    base_opacity: f32,
    life_a: f32,
    life_b: f32,
) -> Option<f32> {
    if distance.is_nan() || distance >= threshold {
        return None;
    }
    Some(((1.0 - distance / threshold) * base_opacity * life_a * life_b).max(0.0))
}

fn render_connections(surface: &mut dyn Surface, entities: &[Entity], connection: Connection) {
    for (i, a) in entities.iter().enumerate() {
        for b in &entities[i + 1..] {
            let distance = a.position.distance(b.position);
            if let Some(alpha) = connection_alpha(
                distance,
                connection.distance,
                connection.opacity,
                a.life_fraction(),
                b.life_fraction(),
            ) {
                surface.stroke_line(a.position, b.position, Paint::new(connection.color, alpha));
            }
        }
    }
}

fn render_particle(surface: &mut dyn Surface, entity: &Entity, pulse: f32) {
    let radius = entity.size * pulse;
    surface.radial_glow(
        entity.position,
        radius * 2.0,
        Paint::new(entity.color, entity.opacity),
    );
    surface.fill_circle(
        entity.position,
        radius,
        Paint::new(
            entity.color,
            entity.opacity * pulse * entity.life_fraction(),
        ),
    );
}

/// Rotate outline points by `angle` and move them to `center`.
fn place(points: &[Vec2], center: Vec2, angle: f32) -> Vec<Vec2> {
    let rotation = Vec2::from_angle(angle);
    points.iter().map(|&p| center + rotation.rotate(p)).collect()
}

fn paint_cube(surface: &mut dyn Surface, center: Vec2, angle: f32, size: f32, paint: Paint) {
    let h = size / 2.0;
    let corners = [
        Vec2::new(-h, -h),
        Vec2::new(h, -h),
        Vec2::new(h, h),
        Vec2::new(-h, h),
    ];
    surface.stroke_polygon(&place(&corners, center, angle), paint);
}

fn paint_pyramid(surface: &mut dyn Surface, center: Vec2, angle: f32, size: f32, paint: Paint) {
    let h = size / 2.0;
    let corners = [Vec2::new(0.0, -h), Vec2::new(-h, h), Vec2::new(h, h)];
    surface.stroke_polygon(&place(&corners, center, angle), paint);
}

fn paint_diamond(surface: &mut dyn Surface, center: Vec2, angle: f32, size: f32, paint: Paint) {
    let h = size / 2.0;
    let corners = [
        Vec2::new(0.0, -h),
        Vec2::new(h, 0.0),
        Vec2::new(0.0, h),
        Vec2::new(-h, 0.0),
    ];
    surface.stroke_polygon(&place(&corners, center, angle), paint);
}

/// Outer circle, two latitude ellipses and three longitude ellipses.
fn paint_ring(surface: &mut dyn Surface, center: Vec2, angle: f32, size: f32, paint: Paint) {
    let r = size / 2.0;
    let step = size / 8.0;
    let outline = ellipse(r, r, 0.0);
    surface.stroke_polygon(&place(&outline, center, angle), paint);

    for i in 1..3 {
        let latitude = ellipse(r, r - i as f32 * step, 0.0);
        surface.stroke_polygon(&place(&latitude, center, angle), paint);
    }
    for i in 0..3 {
        let longitude = ellipse(r - i as f32 * step, r, FRAC_PI_4 * i as f32);
        surface.stroke_polygon(&place(&longitude, center, angle), paint);
    }
}

/// Points of an ellipse with radii `rx`, `ry`, tilted by `tilt`, around the origin.
fn ellipse(rx: f32, ry: f32, tilt: f32) -> Vec<Vec2> {
    let tilt = Vec2::from_angle(tilt);
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let t = i as f32 / ELLIPSE_SEGMENTS as f32 * TAU;
            tilt.rotate(Vec2::new(rx * t.cos(), ry * t.sin()))
        })
        .collect()
}
