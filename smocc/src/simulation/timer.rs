// Counts up from 0 to max_value, in milliseconds of session time.

#[derive(Debug, Clone)]
pub struct Timer {
    pub max_value: f32,
    pub value: f32,
}

impl Timer {
    /// Create a new timer with a max value and an initial value
    pub fn new(max_value: f32, initial_value: f32) -> Self {
        Self {
            max_value,
            value: initial_value,
        }
    }

    /// Returns true if the timer has reached the max value
    pub fn is_ready(&self) -> bool {
        self.value >= self.max_value
    }

    /// Update the timer by dt milliseconds
    pub fn update(&mut self, dt: f32) {
        self.value += dt;
    }

    /// Fraction of the way to the max value, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        (self.value / self.max_value).clamp(0.0, 1.0)
    }

    /// Number of whole periods that elapsed. The remainder is kept.
    pub fn drain(&mut self) -> u32 {
        if !self.is_ready() {
            return 0;
        }
        let periods = (self.value / self.max_value).floor();
        self.value -= periods * self.max_value;
        periods as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_progress_and_ready() {
        let mut timer = Timer::new(400.0, 0.0);
        timer.update(100.0);
        assert_abs_diff_eq!(timer.progress(), 0.25);
        assert!(!timer.is_ready());
        timer.update(350.0);
        assert!(timer.is_ready());
        assert_abs_diff_eq!(timer.progress(), 1.0);
    }

    #[test]
    fn test_drain_keeps_remainder() {
        let mut timer = Timer::new(100.0, 0.0);
        timer.update(50.0);
        assert_eq!(timer.drain(), 0);
        timer.update(200.0);
        assert_eq!(timer.drain(), 2);
        assert_abs_diff_eq!(timer.value, 50.0);
    }
}
