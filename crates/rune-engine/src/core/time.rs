/// Cancellable fixed-interval timer.
/// Converts variable host frame deltas into a whole number of ticks.
pub struct RepeatingTimer {
    /// Seconds between ticks.
    interval: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    active: bool,
}

impl RepeatingTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
            active: true,
        }
    }

    /// Add frame time. Returns the number of ticks that fell due.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if !self.active || self.interval <= 0.0 {
            return 0;
        }
        self.accumulator += frame_dt.max(0.0);
        // Cap to prevent a burst of catch-up ticks after a long pause
        self.accumulator = self.accumulator.min(self.interval * 10.0);
        let ticks = (self.accumulator / self.interval) as u32;
        self.accumulator -= ticks as f32 * self.interval;
        ticks
    }

    /// Stop ticking and drop any accumulated time.
    pub fn cancel(&mut self) {
        self.active = false;
        self.accumulator = 0.0;
    }

    /// Start again from a full interval.
    pub fn restart(&mut self) {
        self.active = true;
        self.accumulator = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fraction of the current interval already elapsed (0.0 to 1.0).
    pub fn progress(&self) -> f32 {
        if self.interval <= 0.0 {
            return 0.0;
        }
        self.accumulator / self.interval
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }
}

/// Single-shot timeout that is pushed back every time it is re-armed.
pub struct DebounceTimer {
    timeout: f32,
    remaining: Option<f32>,
}

impl DebounceTimer {
    pub fn new(timeout: f32) -> Self {
        Self {
            timeout,
            remaining: None,
        }
    }

    /// (Re)start the countdown from the full timeout.
    pub fn arm(&mut self) {
        self.remaining = Some(self.timeout);
    }

    pub fn disarm(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Count down. Returns true exactly once when the timeout elapses.
    pub fn advance(&mut self, frame_dt: f32) -> bool {
        let Some(remaining) = self.remaining.as_mut() else {
            return false;
        };
        *remaining -= frame_dt.max(0.0);
        if *remaining <= 0.0 {
            self.remaining = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_tick_exact() {
        let mut timer = RepeatingTimer::new(2.0);
        assert_eq!(timer.advance(2.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut timer = RepeatingTimer::new(2.0);
        assert_eq!(timer.advance(1.25), 0);
        assert_eq!(timer.advance(1.0), 1);
        assert!((timer.progress() - 0.125).abs() < 1e-5);
    }

    #[test]
    fn caps_at_ten_ticks() {
        let mut timer = RepeatingTimer::new(2.0);
        assert_eq!(timer.advance(600.0), 10);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut timer = RepeatingTimer::new(2.0);
        timer.advance(1.5);
        timer.cancel();
        assert_eq!(timer.advance(10.0), 0);
        timer.restart();
        assert_eq!(timer.advance(1.5), 0);
        assert_eq!(timer.advance(0.5), 1);
    }

    #[test]
    fn debounce_fires_once() {
        let mut timeout = DebounceTimer::new(3.0);
        assert!(!timeout.advance(5.0));
        timeout.arm();
        assert!(!timeout.advance(2.0));
        assert!(timeout.advance(1.0));
        assert!(!timeout.advance(10.0));
    }

    #[test]
    fn rearming_pushes_deadline_back() {
        let mut timeout = DebounceTimer::new(3.0);
        timeout.arm();
        assert!(!timeout.advance(2.5));
        timeout.arm();
        assert!(!timeout.advance(2.5));
        assert!(timeout.advance(0.5));
    }
}
