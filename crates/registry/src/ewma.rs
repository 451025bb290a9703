//! Exponentially weighted moving average, ticked every 5 seconds

use std::time::Duration;

/// Tick interval shared by every `Ewma`
pub const TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Moving average rate (events per second) decaying over a fixed window
#[derive(Debug, Clone)]
pub struct Ewma {
    alpha: f64,
    rate: f64,
    uncounted: u64,
    initialized: bool,
}

impl Ewma {
    fn with_window(minutes: f64) -> Self {
        let alpha = 1.0 - (-TICK_INTERVAL.as_secs_f64() / 60.0 / minutes).exp();
        Self {
            alpha,
            rate: 0.0,
            uncounted: 0,
            initialized: false,
        }
    }

    pub fn one_minute() -> Self {
        Self::with_window(1.0)
    }

    pub fn five_minutes() -> Self {
        Self::with_window(5.0)
    }

    pub fn fifteen_minutes() -> Self {
        Self::with_window(15.0)
    }

    /// Record `n` new events
    pub fn update(&mut self, n: u64) {
        self.uncounted += n;
    }

    /// Fold the events seen since the last tick into the rate
    pub fn tick(&mut self) {
        let instant_rate = self.uncounted as f64 / TICK_INTERVAL.as_secs_f64();
        self.uncounted = 0;
        if self.initialized {
            self.rate += self.alpha * (instant_rate - self.rate);
        } else {
            self.rate = instant_rate;
            self.initialized = true;
        }
    }

    /// Current rate in events per second
    pub fn rate(&self) -> f64 {
        self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_sets_rate() {
        let mut ewma = Ewma::one_minute();
        ewma.update(3);
        ewma.tick();
        assert!((ewma.rate() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_rate_decays_without_events() {
        let mut ewma = Ewma::one_minute();
        ewma.update(3);
        ewma.tick();

        // one minute of silence
        for _ in 0..12 {
            ewma.tick();
        }
        assert!((ewma.rate() - 0.6 * (-1.0f64).exp()).abs() < 1e-6);
    }

    #[test]
    fn test_longer_windows_decay_slower() {
        let mut m1 = Ewma::one_minute();
        let mut m15 = Ewma::fifteen_minutes();
        for ewma in [&mut m1, &mut m15] {
            ewma.update(10);
            ewma.tick();
            ewma.tick();
        }
        assert!(m15.rate() > m1.rate());
    }
}
