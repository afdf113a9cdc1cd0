use macroquad::prelude::*;
use ::rand::Rng;
use shared::geometry::distance;

/// Virtual target drifting across the playfield that a bot is drawn to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointOfInterest {
    pub position: Vec2,
    pub target: Vec2,
    pub velocity: Vec2,
}

/// Uniformly distributed point inside the playfield.
pub fn random_point(playfield: Vec2, rng: &mut impl Rng) -> Vec2 {
    vec2(
        rng.random::<f32>() * playfield.x,
        rng.random::<f32>() * playfield.y,
    )
}

fn heading(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    (to - from).normalize_or_zero() * speed
}

impl PointOfInterest {
    /// Seeds a new point at a random position with a random first target.
    pub fn random(playfield: Vec2, speed: f32, rng: &mut impl Rng) -> Self {
        let position = random_point(playfield, rng);
        let target = random_point(playfield, rng);
        Self {
            position,
            target,
            velocity: heading(position, target, speed),
        }
    }

    /// Moves towards the target. On arrival the point snaps onto it and a new
    /// target is rolled.
    pub fn advance(&mut self, dt_ms: f32, speed: f32, playfield: Vec2, rng: &mut impl Rng) {
        let travel = speed * dt_ms;

        if distance(self.position, self.target) < travel {
            self.position = self.target;
            self.target = random_point(playfield, rng);
            self.velocity = heading(self.position, self.target, speed);
        } else {
            self.position += self.velocity * dt_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ::rand::SeedableRng;
    use ::rand::rngs::StdRng;

    const PLAYFIELD: Vec2 = Vec2::new(1000.0, 720.0);

    #[test]
    fn test_random_seed_is_inside_playfield() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let poi = PointOfInterest::random(PLAYFIELD, 0.1, &mut rng);
            for p in [poi.position, poi.target] {
                assert!(p.x >= 0.0 && p.x <= PLAYFIELD.x);
                assert!(p.y >= 0.0 && p.y <= PLAYFIELD.y);
            }
            if poi.position != poi.target {
                assert_abs_diff_eq!(poi.velocity.length(), 0.1, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_advance_moves_towards_target() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut poi = PointOfInterest {
            position: vec2(100.0, 100.0),
            target: vec2(200.0, 100.0),
            velocity: vec2(0.1, 0.0),
        };

        poi.advance(16.0, 0.1, PLAYFIELD, &mut rng);
        assert_abs_diff_eq!(poi.position.x, 101.6, epsilon = 1e-4);
        assert_abs_diff_eq!(poi.position.y, 100.0);
        assert_eq!(poi.target, vec2(200.0, 100.0));
    }

    #[test]
    fn test_advance_snaps_and_rerolls_on_arrival() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut poi = PointOfInterest {
            position: vec2(199.0, 100.0),
            target: vec2(200.0, 100.0),
            velocity: vec2(0.1, 0.0),
        };

        poi.advance(16.0, 0.1, PLAYFIELD, &mut rng);
        assert_eq!(poi.position, vec2(200.0, 100.0));
        assert_ne!(poi.target, vec2(200.0, 100.0));
        assert_abs_diff_eq!(poi.velocity.length(), 0.1, epsilon = 1e-5);
        let expected = (poi.target - poi.position).normalize() * 0.1;
        assert_abs_diff_eq!(poi.velocity.x, expected.x, epsilon = 1e-6);
        assert_abs_diff_eq!(poi.velocity.y, expected.y, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_time_step_keeps_position() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut poi = PointOfInterest::random(PLAYFIELD, 0.1, &mut rng);
        let before = poi;
        poi.advance(0.0, 0.1, PLAYFIELD, &mut rng);
        assert_eq!(poi, before);
    }
}
