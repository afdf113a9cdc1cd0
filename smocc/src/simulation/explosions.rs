use super::Timer;
use crate::config::ExplosionConfig;
use macroquad::prelude::*;
use shared::SessionView;

pub struct Explosion {
    pub position: Vec2,
    timer: Timer,
}

/// Short-lived hit flashes. Purely cosmetic.
pub struct Explosions {
    explosions: Vec<Explosion>,
    config: ExplosionConfig,
    reset_done: bool,
}

impl Explosions {
    pub fn new(config: ExplosionConfig) -> Self {
        Self {
            explosions: Vec::new(),
            config,
            reset_done: true,
        }
    }

    pub fn spawn(&mut self, position: Vec2) {
        self.explosions.push(Explosion {
            position,
            timer: Timer::new(self.config.duration_ms, 0.0),
        });
    }

    pub fn len(&self) -> usize {
        self.explosions.len()
    }

    /// Position, radius and opacity of every live explosion.
    pub fn iter(&self) -> impl Iterator<Item = (Vec2, f32, f32)> + '_ {
        self.explosions.iter().map(|e| {
            let progress = e.timer.progress();
            (
                e.position,
                self.config.final_radius * progress,
                self.config.initial_opacity * (1.0 - progress),
            )
        })
    }

    pub fn update(&mut self, session: &dyn SessionView) {
        if !session.is_running() {
            if !self.reset_done {
                self.explosions.clear();
                self.reset_done = true;
            }
            return;
        }
        self.reset_done = false;

        let dt = session.delta_time_ms();
        for explosion in &mut self.explosions {
            explosion.timer.update(dt);
        }
        self.explosions.retain(|e| !e.timer.is_ready());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::bots::test_support::FakeSession;
    use approx::assert_abs_diff_eq;

    fn session(dt: f32) -> FakeSession {
        FakeSession {
            running: true,
            dt,
            playfield: vec2(1000.0, 720.0),
        }
    }

    #[test]
    fn test_explosion_grows_fades_and_expires() {
        let mut explosions = Explosions::new(ExplosionConfig::default());
        explosions.spawn(vec2(10.0, 20.0));

        explosions.update(&session(100.0));
        let (position, radius, opacity) = explosions.iter().next().unwrap();
        assert_eq!(position, vec2(10.0, 20.0));
        assert_abs_diff_eq!(radius, 10.0, epsilon = 1e-5);
        assert_abs_diff_eq!(opacity, 0.15, epsilon = 1e-5);

        for _ in 0..3 {
            explosions.update(&session(100.0));
        }
        assert_eq!(explosions.len(), 0);
    }
}
