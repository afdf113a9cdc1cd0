use crate::config::SessionConfig;
use log::info;
use macroquad::prelude::*;
use shared::SessionView;
use shared::geometry::lerp;

/// Clock, score and running state of one game.
pub struct Session {
    running: bool,
    elapsed_ms: f32,
    delta_ms: f32,
    score: u32,
    best_score: u32,
    playfield: Vec2,
    config: SessionConfig,
}

impl Session {
    pub fn new(playfield: Vec2, config: SessionConfig) -> Self {
        Self {
            running: false,
            elapsed_ms: 0.0,
            delta_ms: 0.0,
            score: 0,
            best_score: 0,
            playfield,
            config,
        }
    }

    pub fn begin(&mut self) {
        self.running = true;
        self.elapsed_ms = 0.0;
        self.delta_ms = 0.0;
        self.score = 0;
        info!("Game start!");
    }

    pub fn end(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.delta_ms = 0.0;
        self.best_score = self.best_score.max(self.score);
        info!(
            "Game over after {:.1}s with score {}",
            self.elapsed_ms / 1000.0,
            self.score
        );
    }

    /// Steps the clock by one frame. Long frames are clamped so a stall does
    /// not teleport everything.
    pub fn advance(&mut self, frame_ms: f32) {
        if !self.running {
            self.delta_ms = 0.0;
            return;
        }
        self.delta_ms = frame_ms.clamp(0.0, self.config.max_frame_ms);
        self.elapsed_ms += self.delta_ms;
    }

    /// Ramps from the configured minimum to 1.0 over the session.
    pub fn difficulty(&self) -> f32 {
        let t = (self.elapsed_ms / self.config.difficulty_ramp_ms).min(1.0);
        lerp(self.config.min_difficulty, 1.0, t)
    }

    pub fn increment_score(&mut self) {
        self.score += 1;
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }
}

impl SessionView for Session {
    fn is_running(&self) -> bool {
        self.running
    }

    fn delta_time_ms(&self) -> f32 {
        self.delta_ms
    }

    fn playfield(&self) -> Vec2 {
        self.playfield
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn session() -> Session {
        Session::new(vec2(1000.0, 720.0), SessionConfig::default())
    }

    #[test]
    fn test_clock_only_runs_while_running() {
        let mut s = session();
        s.advance(16.0);
        assert_eq!(s.elapsed_ms(), 0.0);
        assert_eq!(s.delta_time_ms(), 0.0);

        s.begin();
        s.advance(16.0);
        s.advance(1000.0);
        assert_eq!(s.delta_time_ms(), 50.0);
        assert_abs_diff_eq!(s.elapsed_ms(), 66.0);
    }

    #[test]
    fn test_difficulty_ramps_and_caps() {
        let mut s = session();
        s.begin();
        assert_abs_diff_eq!(s.difficulty(), 0.1);
        for _ in 0..1200 {
            s.advance(50.0);
        }
        assert_abs_diff_eq!(s.difficulty(), 0.55, epsilon = 1e-3);
        for _ in 0..5000 {
            s.advance(50.0);
        }
        assert_abs_diff_eq!(s.difficulty(), 1.0);
    }

    #[test]
    fn test_end_keeps_best_score() {
        let mut s = session();
        s.begin();
        s.increment_score();
        s.increment_score();
        s.end();
        assert!(!s.is_running());
        s.begin();
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 2);
    }
}
