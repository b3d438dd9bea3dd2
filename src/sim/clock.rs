/// Fixed-step simulation clock.
///
/// One tick per rendered frame. `now` is derived from the tick count rather
/// than sampled from the wall clock, so every entity in a tick sees the same
/// time and a slow frame never makes the simulation skip ahead.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    step: f64,
}

impl SimClock {
    /// Clock advancing `tick_rate` ticks per simulated second.
    pub fn new(tick_rate: u32) -> Self {
        SimClock {
            tick: 0,
            step: 1.0 / tick_rate.max(1) as f64,
        }
    }

    /// Move to the next tick and return its timestamp.
    pub fn advance(&mut self) -> f64 {
        self.tick += 1;
        self.now()
    }

    pub fn now(&self) -> f64 {
        self.tick as f64 * self.step
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_by_one_step_per_tick() {
        let mut clock = SimClock::new(60);
        assert_eq!(clock.now(), 0.0);
        for _ in 0..60 {
            clock.advance();
        }
        assert_eq!(clock.tick(), 60);
        assert!((clock.now() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_rate_is_treated_as_one() {
        let mut clock = SimClock::new(0);
        assert_eq!(clock.advance(), 1.0);
    }
}
