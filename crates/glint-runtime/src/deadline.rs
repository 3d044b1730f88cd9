//! One-shot and repeating timers on page time

/// A one-shot timer. Fires at most once per arming.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deadline {
    at: Option<f64>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm for an absolute page time, replacing any earlier arming
    pub fn arm_at(&mut self, at: f64) {
        self.at = Some(at);
    }

    /// Arm `delay` seconds after `now`
    pub fn arm(&mut self, now: f64, delay: f64) {
        self.arm_at(now + delay.max(0.0));
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    pub fn due_at(&self) -> Option<f64> {
        self.at
    }

    /// Returns true exactly once, on the first call at or after the due time
    pub fn fire_if_due(&mut self, now: f64) -> bool {
        match self.at {
            Some(at) if now >= at => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

/// A fixed-period repeating timer.
///
/// Catches up at most one period per call; a long stall yields one tick,
/// not a burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    period: f64,
    next: f64,
}

impl Interval {
    /// First tick one `period` after `now`
    pub fn new(now: f64, period: f64) -> Self {
        let period = period.max(f64::EPSILON);
        Self {
            period,
            next: now + period,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Change the period; the next tick is rescheduled from `now`
    pub fn set_period(&mut self, now: f64, period: f64) {
        *self = Self::new(now, period);
    }

    pub fn tick(&mut self, now: f64) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_fires_once() {
        let mut d = Deadline::new();
        d.arm(1.0, 2.0);
        assert!(!d.fire_if_due(2.9));
        assert!(d.fire_if_due(3.0));
        assert!(!d.fire_if_due(4.0));
        assert!(!d.is_armed());
    }

    #[test]
    fn cancelled_deadline_never_fires() {
        let mut d = Deadline::new();
        d.arm_at(0.5);
        d.cancel();
        assert!(!d.fire_if_due(10.0));
    }

    #[test]
    fn negative_delay_is_immediate() {
        let mut d = Deadline::new();
        d.arm(2.0, -1.0);
        assert_eq!(d.due_at(), Some(2.0));
        assert!(d.fire_if_due(2.0));
    }

    #[test]
    fn interval_ticks_each_period() {
        let mut i = Interval::new(0.0, 3.0);
        let ticks = (1..=100)
            .filter(|f| i.tick(*f as f64 * 0.1))
            .count();
        assert_eq!(ticks, 3);
    }

    #[test]
    fn interval_does_not_burst_after_stall() {
        let mut i = Interval::new(0.0, 1.0);
        assert!(i.tick(10.0));
        assert!(!i.tick(10.5));
        assert!(i.tick(11.0));
    }
}
