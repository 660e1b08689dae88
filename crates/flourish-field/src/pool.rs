//! Entity pool creation.

use flourish_core::{Bounds, FieldKind, FieldParams, ShapeKind};
use glam::Vec2;
use rand::Rng;

use crate::entity::{Entity, Life, Silhouette, Spin, random_point};

/// Create `count` entities with every attribute drawn independently from
/// the ranges in `params`.
pub fn populate<R: Rng + ?Sized>(
    count: usize,
    bounds: Bounds,
    params: &FieldParams,
    rng: &mut R,
) -> Vec<Entity> {
    (0..count).map(|_| spawn(bounds, params, rng)).collect()
}

fn spawn<R: Rng + ?Sized>(bounds: Bounds, params: &FieldParams, rng: &mut R) -> Entity {
    let position = random_point(bounds, rng);
    let velocity = Vec2::new(params.speed.sample(rng), params.speed.sample(rng));
    let size = params.size.sample(rng).max(0.0);
    let opacity = params.opacity.sample(rng).clamp(0.0, 1.0);
    let phase = FieldParams::random_phase(rng);
    let phase_rate = params.phase_rate.sample(rng);
    let color = params.random_color(rng);

    let (silhouette, spin) = match params.kind {
        FieldKind::Shapes => (
            Silhouette::Shape(ShapeKind::random(rng)),
            Some(Spin {
                angle: FieldParams::random_phase(rng),
                rate: params.rotation_rate.sample(rng),
            }),
        ),
        FieldKind::Particles => (Silhouette::Particle, None),
    };
    let life = params.lifespan.map(|span| Life::new(span.sample(rng)));

    Entity {
        position,
        velocity,
        baseline: velocity,
        size,
        phase,
        phase_rate,
        spin,
        opacity,
        life,
        color,
        silhouette,
    }
}

#[cfg(test)]
mod tests {
    use flourish_core::Span;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;

    #[test]
    fn test_populate_count_and_ranges() {
        let mut rng = SmallRng::seed_from_u64(11);
        let bounds = Bounds::new(640.0, 384.0);
        let params = FieldParams::shapes();
        let entities = populate(25, bounds, &params, &mut rng);

        assert_eq!(entities.len(), 25);
        for e in &entities {
            assert!(e.position.x >= 0.0 && e.position.x < 640.0);
            assert!(e.position.y >= 0.0 && e.position.y < 384.0);
            assert!((20.0..=60.0).contains(&e.size));
            assert!((0.1..=0.3).contains(&e.opacity));
            assert!((-0.3..=0.3).contains(&e.velocity.x));
            assert!((-0.3..=0.3).contains(&e.velocity.y));
            assert!((0.005..=0.015).contains(&e.phase_rate));
            assert_eq!(e.baseline, e.velocity);
            assert!(matches!(e.silhouette, Silhouette::Shape(_)));
            assert!(e.spin.is_some());
            assert!(e.life.is_none());
            assert!(params.palette.contains(&e.color));
        }
    }

    #[test]
    fn test_particles_start_with_full_life() {
        let mut rng = SmallRng::seed_from_u64(5);
        let entities = populate(
            10,
            Bounds::new(100.0, 100.0),
            &FieldParams::particles(),
            &mut rng,
        );
        for e in &entities {
            assert_eq!(e.silhouette, Silhouette::Particle);
            assert!(e.spin.is_none());
            let life = e.life.unwrap();
            assert_eq!(life.remaining, 1.0);
            assert!((100.0..=250.0).contains(&life.max));
        }
    }

    #[test]
    fn test_populate_zero_and_degenerate_inputs() {
        let mut rng = SmallRng::seed_from_u64(5);
        assert!(populate(0, Bounds::new(10.0, 10.0), &FieldParams::shapes(), &mut rng).is_empty());

        let params = FieldParams {
            size: Span::fixed(2.0),
            palette: Vec::new(),
            ..FieldParams::particles()
        };
        let entities = populate(3, Bounds::default(), &params, &mut rng);
        assert_eq!(entities.len(), 3);
        assert!(entities.iter().all(|e| e.position == Vec2::ZERO && e.size == 2.0));
    }

    #[test]
    fn test_every_shape_kind_appears() {
        let mut rng = SmallRng::seed_from_u64(99);
        let entities = populate(
            200,
            Bounds::new(100.0, 100.0),
            &FieldParams::shapes(),
            &mut rng,
        );
        for kind in ShapeKind::ALL {
            assert!(entities.iter().any(|e| e.silhouette == Silhouette::Shape(kind)));
        }
    }
}
