use macroquad::prelude::*;
use shared::geometry::rotate_towards;
use std::f32::consts::TAU;

/// Earliest non-negative time at which a projectile fired from `shooter` at
/// `projectile_speed` can meet a target at `target` moving with `velocity`.
pub fn intercept_time(shooter: Vec2, target: Vec2, velocity: Vec2, projectile_speed: f32) -> Option<f32> {
    let offset = target - shooter;
    let a = velocity.length_squared() - projectile_speed * projectile_speed;
    let b = 2.0 * velocity.dot(offset);
    let c = offset.length_squared();

    // Target as fast as the projectile: the quadratic degenerates to b*t + c = 0.
    if a.abs() <= f32::EPSILON {
        if b == 0.0 {
            return None;
        }
        let t = -c / b;
        return (t >= 0.0 && t.is_finite()).then_some(t);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let usable = |t: f32| if t >= 0.0 && t.is_finite() { t } else { f32::INFINITY };
    let t1 = usable((-b + root) / (2.0 * a));
    let t2 = usable((-b - root) / (2.0 * a));
    let t = t1.min(t2);

    t.is_finite().then_some(t)
}

/// Unit direction to fire in so the projectile intercepts the moving target.
///
/// Falls back to aiming at the target's current position when no intercept
/// exists. Returns `None` only when the shooter sits exactly on the aim point.
pub fn lead_aim(shooter: Vec2, target: Vec2, velocity: Vec2, projectile_speed: f32) -> Option<Vec2> {
    let aim_point = match intercept_time(shooter, target, velocity, projectile_speed) {
        Some(t) => target + velocity * t,
        None => target,
    };

    (aim_point - shooter)
        .try_normalize()
        .or_else(|| (target - shooter).try_normalize())
}

/// Turns an aim direction towards a desired one at a bounded angular rate.
#[derive(Debug, Clone, Copy)]
pub struct AimController {
    radians_per_ms: f32,
}

impl AimController {
    pub fn new(full_rotation_ms: f32) -> Self {
        Self {
            radians_per_ms: TAU / full_rotation_ms,
        }
    }

    pub fn radians_per_ms(&self) -> f32 {
        self.radians_per_ms
    }

    /// Advances `current` towards `desired` over `dt_ms`. The result is unit
    /// length and snaps to `desired` when the step would overshoot it.
    pub fn step(&self, current: Vec2, desired: Vec2, dt_ms: f32) -> Vec2 {
        let next = rotate_towards(current, desired, self.radians_per_ms * dt_ms);
        next.try_normalize().unwrap_or(desired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ::rand::rngs::StdRng;
    use ::rand::{Rng, SeedableRng};
    use rstest::rstest;
    use shared::geometry::{UNIT_TOLERANCE, direction, is_unit, rotate};

    fn turn_angle(from: Vec2, to: Vec2) -> f32 {
        from.perp_dot(to).atan2(from.dot(to)).abs()
    }

    #[rstest]
    #[case(0.1)]
    #[case(0.5)]
    #[case(1.0)]
    #[case(25.0)]
    fn test_stationary_target_is_aimed_at_directly(#[case] speed: f32) {
        let aim = lead_aim(Vec2::ZERO, vec2(100.0, 0.0), Vec2::ZERO, speed).unwrap();
        assert_eq!(aim, vec2(1.0, 0.0));
    }

    #[test]
    fn test_negative_discriminant_falls_back_to_direct_aim() {
        let shooter = vec2(10.0, 20.0);
        let target = vec2(110.0, 20.0);
        // Fast sideways target that the projectile can never catch.
        let velocity = vec2(0.0, 1.0);
        assert!(intercept_time(shooter, target, velocity, 0.5).is_none());
        assert_eq!(
            lead_aim(shooter, target, velocity, 0.5),
            Some(direction(shooter, target))
        );
    }

    #[test]
    fn test_both_roots_negative_falls_back_to_direct_aim() {
        // Target runs away faster than the projectile flies.
        let velocity = vec2(1.0, 0.0);
        let target = vec2(100.0, 0.0);
        assert!(intercept_time(Vec2::ZERO, target, velocity, 0.5).is_none());
        assert_eq!(lead_aim(Vec2::ZERO, target, velocity, 0.5), Some(vec2(1.0, 0.0)));
    }

    #[test]
    fn test_equal_speeds_use_linear_solution() {
        // Target approaching head-on at projectile speed meets halfway.
        let t = intercept_time(Vec2::ZERO, vec2(100.0, 0.0), vec2(-0.5, 0.0), 0.5).unwrap();
        assert_abs_diff_eq!(t, 100.0, epsilon = 1e-3);
    }

    #[test]
    fn test_moving_target_is_intercepted() {
        let shooter = vec2(0.0, 0.0);
        let target = vec2(200.0, 50.0);
        let velocity = vec2(-0.1, 0.2);
        let speed = 0.5;

        let t = intercept_time(shooter, target, velocity, speed).unwrap();
        let meet = target + velocity * t;
        assert_abs_diff_eq!(meet.distance(shooter), speed * t, epsilon = 0.05);

        let aim = lead_aim(shooter, target, velocity, speed).unwrap();
        assert!(is_unit(aim, UNIT_TOLERANCE));
        assert_abs_diff_eq!(aim.dot(direction(shooter, meet)), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_shooter_on_target_has_no_direction() {
        let p = vec2(5.0, 5.0);
        assert!(lead_aim(p, p, Vec2::ZERO, 0.5).is_none());
    }

    #[test]
    fn test_step_is_bounded_by_turn_rate() {
        let controller = AimController::new(1000.0);
        let dt = 16.0;
        let current = vec2(1.0, 0.0);
        let desired = vec2(-1.0, 0.1).normalize();

        let next = controller.step(current, desired, dt);
        assert_abs_diff_eq!(
            turn_angle(current, next),
            controller.radians_per_ms() * dt,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_step_snaps_when_overshooting() {
        let controller = AimController::new(1000.0);
        let current = vec2(0.0, 1.0);
        let desired = rotate(current, 0.01);

        let next = controller.step(current, desired, 16.0);
        assert_abs_diff_eq!(next.x, desired.x, epsilon = 1e-6);
        assert_abs_diff_eq!(next.y, desired.y, epsilon = 1e-6);
    }

    #[test]
    fn test_fast_controller_settles_instead_of_oscillating() {
        // More than half a turn per frame.
        let controller = AimController::new(60.0);
        let current = vec2(1.0, 0.0);
        let desired = rotate(current, 0.5);

        let mut aim = current;
        for _ in 0..4 {
            aim = controller.step(aim, desired, 50.0);
            assert_abs_diff_eq!(aim.x, desired.x, epsilon = 1e-5);
            assert_abs_diff_eq!(aim.y, desired.y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_aim_stays_unit_and_bounded_over_many_steps() {
        let controller = AimController::new(1000.0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut aim = vec2(1.0, 0.0);

        for _ in 0..5000 {
            let angle = rng.random::<f32>() * TAU;
            let desired = vec2(angle.cos(), -angle.sin());
            let dt = rng.random_range(1.0..40.0);
            let next = controller.step(aim, desired, dt);

            assert!(is_unit(next, UNIT_TOLERANCE));
            let turned = turn_angle(aim, next);
            let snapped = next.distance(desired) < 1e-5;
            assert!(snapped || turned <= controller.radians_per_ms() * dt + 1e-3);
            aim = next;
        }
    }
}
