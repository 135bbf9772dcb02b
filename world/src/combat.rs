//! Pure combat math shared by the command handlers.

use ar_skirmish_core::{CombatTuning, GrenadeTuning, WorldPoint, OBSTRUCTION_PENALTY};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Resolved targeting numbers for one attacker and target pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShotProfile {
    pub(crate) hit_chance: f32,
    pub(crate) damage_multiplier: f32,
}

/// Maps the distance to a target onto a hit chance and damage multiplier,
/// applying the obstruction penalty to both when the line of sight is
/// blocked.
pub(crate) fn shot_profile(tuning: &CombatTuning, distance: f32, obstructed: bool) -> ShotProfile {
    let base = tuning.hit_chance(distance);
    if obstructed {
        ShotProfile {
            hit_chance: (base - OBSTRUCTION_PENALTY).max(0.0),
            damage_multiplier: 1.0 - OBSTRUCTION_PENALTY,
        }
    } else {
        ShotProfile {
            hit_chance: base,
            damage_multiplier: 1.0,
        }
    }
}

/// Rolls one shot against the profile. Returns the damage on a hit.
pub(crate) fn roll_shot(
    rng: &mut ChaCha8Rng,
    tuning: &CombatTuning,
    profile: ShotProfile,
) -> Option<f32> {
    if rng.gen::<f32>() >= profile.hit_chance {
        return None;
    }
    let damage = rng.gen_range(tuning.min_damage..=tuning.max_damage);
    Some(damage as f32 * profile.damage_multiplier)
}

/// Initial projectile velocity for a throw along `forward` scaled by the
/// drag magnitude. The vertical lift is half the horizontal speed, giving
/// the projectile an arc without a separate aim pitch.
pub(crate) fn release_velocity(
    tuning: &GrenadeTuning,
    forward: WorldPoint,
    drag_length: f32,
) -> WorldPoint {
    let speed = drag_length * tuning.throw_power;
    forward
        .scaled(speed)
        .plus(WorldPoint::new(0.0, speed * 0.5, 0.0))
}

/// Position of a projectile `elapsed` seconds after release under constant
/// velocity plus gravity.
pub(crate) fn ballistic_position(
    origin: WorldPoint,
    velocity: WorldPoint,
    gravity: f32,
    elapsed: f32,
) -> WorldPoint {
    let drop = 0.5 * gravity * elapsed * elapsed;
    origin
        .plus(velocity.scaled(elapsed))
        .minus(WorldPoint::new(0.0, drop, 0.0))
}

/// Reports whether the ground-plane projection of the segment from `from`
/// to `to` passes within `radius` of `center`.
pub(crate) fn segment_hits_circle(
    from: WorldPoint,
    to: WorldPoint,
    center: WorldPoint,
    radius: f32,
) -> bool {
    let ax = from.x();
    let az = from.z();
    let dx = to.x() - ax;
    let dz = to.z() - az;
    let length_squared = dx * dx + dz * dz;

    let t = if length_squared == 0.0 {
        0.0
    } else {
        let cx = center.x() - ax;
        let cz = center.z() - az;
        ((cx * dx + cz * dz) / length_squared).clamp(0.0, 1.0)
    };

    let nearest = WorldPoint::new(ax + dx * t, center.y(), az + dz * t);
    nearest.horizontal_distance_to(center) <= radius
}

#[cfg(test)]
mod tests {
    use super::{
        ballistic_position, release_velocity, roll_shot, segment_hits_circle, shot_profile,
    };
    use ar_skirmish_core::{CombatTuning, GrenadeTuning, WorldPoint};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn obstruction_penalizes_chance_and_damage() {
        let tuning = CombatTuning::default();
        let clear = shot_profile(&tuning, tuning.min_range, false);
        let blocked = shot_profile(&tuning, tuning.min_range, true);

        assert_eq!(clear.hit_chance, 1.0);
        assert_eq!(clear.damage_multiplier, 1.0);
        assert_eq!(blocked.hit_chance, 0.5);
        assert_eq!(blocked.damage_multiplier, 0.5);
    }

    #[test]
    fn obstructed_chance_never_goes_negative() {
        let tuning = CombatTuning::default();
        let profile = shot_profile(&tuning, tuning.max_range, true);
        assert_eq!(profile.hit_chance, 0.0);
    }

    #[test]
    fn certain_shots_always_land_within_the_damage_bounds() {
        let tuning = CombatTuning::default();
        let profile = shot_profile(&tuning, 0.0, false);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..100 {
            let damage = roll_shot(&mut rng, &tuning, profile).expect("certain hit");
            assert!(damage >= tuning.min_damage as f32);
            assert!(damage <= tuning.max_damage as f32);
        }
    }

    #[test]
    fn impossible_shots_never_land() {
        let tuning = CombatTuning::default();
        let profile = shot_profile(&tuning, tuning.max_range, false);
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        for _ in 0..100 {
            assert!(roll_shot(&mut rng, &tuning, profile).is_none());
        }
    }

    #[test]
    fn shot_rolls_are_deterministic_per_seed() {
        let tuning = CombatTuning::default();
        let profile = shot_profile(&tuning, 150.0, false);
        let mut first = ChaCha8Rng::seed_from_u64(99);
        let mut second = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..50 {
            assert_eq!(
                roll_shot(&mut first, &tuning, profile),
                roll_shot(&mut second, &tuning, profile)
            );
        }
    }

    #[test]
    fn release_velocity_scales_with_the_drag() {
        let tuning = GrenadeTuning::default();
        let forward = WorldPoint::new(1.0, 0.0, 0.0);
        let velocity = release_velocity(&tuning, forward, 100.0);

        assert!((velocity.x() - 100.0 * tuning.throw_power).abs() < f32::EPSILON);
        assert!((velocity.y() - 50.0 * tuning.throw_power).abs() < f32::EPSILON);
        assert_eq!(velocity.z(), 0.0);
    }

    #[test]
    fn ballistic_position_drops_under_gravity() {
        let origin = WorldPoint::new(0.0, 100.0, 0.0);
        let velocity = WorldPoint::new(10.0, 0.0, 0.0);
        let position = ballistic_position(origin, velocity, 10.0, 2.0);

        assert!((position.x() - 20.0).abs() < f32::EPSILON);
        assert!((position.y() - 80.0).abs() < f32::EPSILON);
    }

    #[test]
    fn segments_through_a_circle_are_detected() {
        let center = WorldPoint::new(50.0, 0.0, 0.0);
        let from = WorldPoint::ORIGIN;
        let to = WorldPoint::new(100.0, 0.0, 0.0);
        assert!(segment_hits_circle(from, to, center, 10.0));
    }

    #[test]
    fn segments_missing_a_circle_are_clear() {
        let center = WorldPoint::new(50.0, 0.0, 40.0);
        let from = WorldPoint::ORIGIN;
        let to = WorldPoint::new(100.0, 0.0, 0.0);
        assert!(!segment_hits_circle(from, to, center, 10.0));
    }

    #[test]
    fn circles_beyond_the_segment_ends_are_clear() {
        let center = WorldPoint::new(150.0, 0.0, 0.0);
        let from = WorldPoint::ORIGIN;
        let to = WorldPoint::new(100.0, 0.0, 0.0);
        assert!(!segment_hits_circle(from, to, center, 10.0));
    }

    #[test]
    fn height_differences_do_not_affect_the_trace() {
        let center = WorldPoint::new(50.0, 500.0, 0.0);
        let from = WorldPoint::new(0.0, -20.0, 0.0);
        let to = WorldPoint::new(100.0, 30.0, 0.0);
        assert!(segment_hits_circle(from, to, center, 10.0));
    }
}
