//! Per-frame simulation step.

use flourish_core::{Bounds, FieldParams};
use glam::Vec2;
use rand::Rng;

use crate::entity::Entity;

/// Advance every entity by one frame.
///
/// `pointer` is the latest pointer position in surface units; `None` means
/// no pointer has been seen and behaves like a pointer infinitely far away.
pub fn step<R: Rng + ?Sized>(
    entities: &mut [Entity],
    pointer: Option<Vec2>,
    bounds: Bounds,
    params: &FieldParams,
    rng: &mut R,
) {
    for entity in entities {
        step_entity(entity, pointer, bounds, params, rng);
    }
}

fn step_entity<R: Rng + ?Sized>(
    entity: &mut Entity,
    pointer: Option<Vec2>,
    bounds: Bounds,
    params: &FieldParams,
    rng: &mut R,
) {
    entity.position += entity.velocity;

    entity.phase += entity.phase_rate;
    if let Some(spin) = entity.spin.as_mut() {
        spin.angle += spin.rate;
    }

    let mut attracted = false;
    if let (Some(pointer), Some(attraction)) = (pointer, params.attraction) {
        let toward = pointer - entity.position;
        let distance = toward.length();
        if distance < attraction.radius {
            attracted = true;
            // Coincident with the pointer: no direction to pull in.
            if distance > 0.0 {
                let force = (attraction.radius - distance) / attraction.radius;
                entity.velocity += toward / distance * force * attraction.strength;
            }
        }
    }

    if !attracted && let Some(rate) = params.relaxation {
        entity.velocity += (entity.baseline - entity.velocity) * rate;
    }

    let mut expired = false;
    if let Some(life) = entity.life.as_mut() {
        life.remaining -= 1.0 / life.max;
        expired = life.remaining <= 0.0;
    }
    if expired {
        entity.respawn(bounds, rng);
    }

    entity.wrap(bounds);
}

#[cfg(test)]
mod tests {
    use flourish_core::ShapeKind;
    use rand::{SeedableRng, rngs::SmallRng};

    use super::*;
    use crate::entity::Life;
    use crate::pool::populate;

    const FAR: Vec2 = Vec2::new(1000.0, 1000.0);

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn test_single_tick_integrates_velocity() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut entities = vec![Entity::particle(Vec2::ZERO, Vec2::ONE, 2.0)];
        step(
            &mut entities,
            Some(FAR),
            bounds,
            &FieldParams::particles(),
            &mut rng(),
        );
        assert_eq!(entities[0].position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_single_tick_wraps_to_far_edge() {
        let bounds = Bounds::new(100.0, 100.0);
        let size = 0.5;
        let mut entities = vec![Entity::shape(
            ShapeKind::Cube,
            Vec2::ZERO,
            Vec2::new(-1.0, -1.0),
            size,
        )];
        step(
            &mut entities,
            Some(FAR),
            bounds,
            &FieldParams::shapes(),
            &mut rng(),
        );
        assert_eq!(entities[0].position, Vec2::new(100.0 + size, 100.0 + size));
    }

    #[test]
    fn test_attraction_pulls_toward_pointer() {
        let bounds = Bounds::new(500.0, 500.0);
        let params = FieldParams::shapes();
        let mut entities = vec![Entity::shape(
            ShapeKind::Ring,
            Vec2::new(100.0, 100.0),
            Vec2::ZERO,
            30.0,
        )];
        step(
            &mut entities,
            Some(Vec2::new(175.0, 100.0)),
            bounds,
            &params,
            &mut rng(),
        );
        // Half the radius away: force = 0.5 * 0.005 along +x.
        assert!((entities[0].velocity.x - 0.0025).abs() < 1e-7);
        assert_eq!(entities[0].velocity.y, 0.0);
    }

    #[test]
    fn test_shapes_keep_accumulated_velocity() {
        let bounds = Bounds::new(500.0, 500.0);
        let params = FieldParams::shapes();
        let mut entities = vec![Entity::shape(
            ShapeKind::Diamond,
            Vec2::new(250.0, 250.0),
            Vec2::new(0.5, 0.0),
            30.0,
        )];
        entities[0].baseline = Vec2::ZERO;
        step(&mut entities, Some(FAR), bounds, &params, &mut rng());
        assert_eq!(entities[0].velocity, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn test_pointer_on_entity_does_not_produce_nan() {
        let bounds = Bounds::new(200.0, 200.0);
        let params = FieldParams::particles();
        for offset in [0.0, f32::EPSILON, 1e-6] {
            let mut entities = vec![Entity::particle(
                Vec2::new(50.0, 50.0),
                Vec2::new(0.2, -0.1),
                2.0,
            )];
            // The pointer sits where the entity lands after integration.
            let pointer = Vec2::new(50.2 - offset, 49.9 - offset);
            step(&mut entities, Some(pointer), bounds, &params, &mut rng());
            let v = entities[0].velocity;
            assert!(!v.x.is_nan() && !v.y.is_nan(), "offset {offset}: {v:?}");
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_exact_pointer_hit_skips_force() {
        let bounds = Bounds::new(200.0, 200.0);
        let params = FieldParams::particles();
        let mut entities = vec![Entity::particle(Vec2::new(50.0, 50.0), Vec2::ZERO, 2.0)];
        step(
            &mut entities,
            Some(Vec2::new(50.0, 50.0)),
            bounds,
            &params,
            &mut rng(),
        );
        assert_eq!(entities[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn test_particles_relax_toward_baseline() {
        let bounds = Bounds::new(300.0, 300.0);
        let params = FieldParams::particles();
        let mut rng = rng();
        let mut entities = populate(20, bounds, &params, &mut rng);
        for e in &mut entities {
            e.velocity = e.baseline + Vec2::new(2.0, -1.5);
        }

        let mut gaps: Vec<f32> = entities
            .iter()
            .map(|e| (e.velocity - e.baseline).length())
            .collect();
        for _ in 0..50 {
            step(&mut entities, Some(Vec2::splat(1.0e6)), bounds, &params, &mut rng);
            for (e, gap) in entities.iter().zip(gaps.iter_mut()) {
                let next = (e.velocity - e.baseline).length();
                assert!(next < *gap, "gap grew from {gap} to {next}");
                *gap = next;
            }
        }
    }

    #[test]
    fn test_relaxation_without_pointer() {
        let bounds = Bounds::new(300.0, 300.0);
        let mut entities = vec![Entity::particle(
            Vec2::new(10.0, 10.0),
            Vec2::new(1.0, 0.0),
            1.0,
        )];
        entities[0].baseline = Vec2::ZERO;
        step(
            &mut entities,
            None,
            bounds,
            &FieldParams::particles(),
            &mut rng(),
        );
        assert!((entities[0].velocity.x - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_expired_particle_respawns_in_place() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut entities = vec![Entity::particle(
            Vec2::new(20.0, 20.0),
            Vec2::ZERO,
            1.0,
        )];
        entities[0].life = Some(Life {
            remaining: 0.004,
            max: 100.0,
        });
        step(
            &mut entities,
            None,
            bounds,
            &FieldParams::particles(),
            &mut rng(),
        );
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].life_fraction(), 1.0);
    }

    #[test]
    fn test_phase_and_rotation_advance() {
        let bounds = Bounds::new(100.0, 100.0);
        let mut e = Entity::shape(ShapeKind::Pyramid, Vec2::new(50.0, 50.0), Vec2::ZERO, 20.0);
        e.phase_rate = 0.01;
        e.spin = Some(crate::entity::Spin {
            angle: 1.0,
            rate: -0.004,
        });
        let mut entities = vec![e];
        step(&mut entities, None, bounds, &FieldParams::shapes(), &mut rng());
        assert!((entities[0].phase - 0.01).abs() < 1e-7);
        assert!((entities[0].spin.unwrap().angle - 0.996).abs() < 1e-6);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn params() -> impl Strategy<Value = FieldParams> {
            prop_oneof![
                Just(FieldParams::shapes()),
                Just(FieldParams::particles()),
                Just(FieldParams::ambient()),
            ]
        }

        proptest! {
            #[test]
            fn positions_stay_within_wrap_margin(
                params in params(),
                seed in any::<u64>(),
                width in 1.0f32..800.0,
                height in 1.0f32..600.0,
                px in -200.0f32..1000.0,
                py in -200.0f32..800.0,
                ticks in 1usize..300,
            ) {
                let mut rng = SmallRng::seed_from_u64(seed);
                let bounds = Bounds::new(width, height);
                let mut entities = populate(12, bounds, &params, &mut rng);
                for _ in 0..ticks {
                    step(&mut entities, Some(Vec2::new(px, py)), bounds, &params, &mut rng);
                    for e in &entities {
                        prop_assert!(
                            bounds.contains_with_margin(e.position.x, e.position.y, e.size),
                            "{:?} escaped {:?}", e.position, bounds
                        );
                    }
                }
            }

            #[test]
            fn life_stays_in_unit_interval(
                seed in any::<u64>(),
                ticks in 1usize..600,
            ) {
                let params = FieldParams::particles();
                let mut rng = SmallRng::seed_from_u64(seed);
                let bounds = Bounds::new(320.0, 200.0);
                let mut entities = populate(15, bounds, &params, &mut rng);
                for _ in 0..ticks {
                    step(&mut entities, None, bounds, &params, &mut rng);
                    for e in &entities {
                        let life = e.life_fraction();
                        prop_assert!(life > 0.0 && life <= 1.0, "life {life}");
                    }
                }
            }
        }
    }
}
