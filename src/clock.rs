//! Millisecond timestamps and the wrap-aware helpers every timer builds on.
//!
//! Only differences between two readings are meaningful. All comparisons go
//! through [`elapsed`], which uses wrapping subtraction, so a counter that
//! rolls over between two readings still yields the right interval as long
//! as the interval itself is shorter than the counter range (~49 days).

/// A reading of the monotonic millisecond counter.
pub type Millis = u32;

/// Source of monotonic millisecond timestamps.
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Milliseconds from `then` to `now`, correct across wraparound.
#[inline]
pub const fn elapsed(now: Millis, then: Millis) -> u32 {
    now.wrapping_sub(then)
}

/// Fixed-cadence gate for polled work.
///
/// The first poll always fires. After that the gate fires once per `period`
/// on a fixed phase (`last += period`), so jitter in the loop does not drift
/// the cadence. If the caller falls more than one period behind, the phase
/// resynchronises to `now` instead of bursting to catch up.
#[derive(Clone, Copy, Debug)]
pub struct Interval {
    period: u32,
    last: Option<Millis>,
}

impl Interval {
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period: period_ms,
            last: None,
        }
    }

    /// Returns `true` when a period has elapsed since the last fire.
    pub fn poll(&mut self, now: Millis) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            return true;
        };

        let since = elapsed(now, last);
        if since < self.period {
            return false;
        }

        self.last = Some(if since >= self.period.saturating_mul(2) {
            now
        } else {
            last.wrapping_add(self.period)
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_handles_wraparound() {
        assert_eq!(elapsed(5, u32::MAX - 4), 10);
        assert_eq!(elapsed(100, 40), 60);
        assert_eq!(elapsed(7, 7), 0);
    }

    #[test]
    fn interval_fires_first_then_every_period() {
        let mut gate = Interval::new(10);
        assert!(gate.poll(1_000));
        assert!(!gate.poll(1_005));
        assert!(!gate.poll(1_009));
        assert!(gate.poll(1_010));
        assert!(!gate.poll(1_019));
        assert!(gate.poll(1_023));
        // Phase stays locked to 1_000 + k * 10.
        assert!(gate.poll(1_030));
    }

    #[test]
    fn interval_resyncs_after_stall() {
        let mut gate = Interval::new(10);
        assert!(gate.poll(0));
        assert!(gate.poll(500));
        // No burst of catch-up fires.
        assert!(!gate.poll(501));
        assert!(!gate.poll(509));
        assert!(gate.poll(510));
    }

    #[test]
    fn interval_across_counter_wrap() {
        let mut gate = Interval::new(10);
        assert!(gate.poll(u32::MAX - 3));
        assert!(!gate.poll(u32::MAX));
        assert!(!gate.poll(5));
        assert!(gate.poll(6));
    }
}
