//! Debounced on/off toggle driven by a single push button.
//!
//! An event fires on a rising edge of the sampled level, unless the previous
//! accepted toggle is less than (or exactly) `guard_ms` old. A second press
//! inside the guard is ignored, deliberate or not.

use crate::clock::{elapsed, Millis};

/// One accepted press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleEvent;

#[derive(Clone, Copy, Debug)]
pub struct DebouncedToggle {
    guard_ms: u32,
    last_level: bool,
    last_toggle: Option<Millis>,
}

impl DebouncedToggle {
    pub const fn new(guard_ms: u32) -> Self {
        Self {
            guard_ms,
            last_level: false,
            last_toggle: None,
        }
    }

    /// Feed one sample. `level` is active-true (already inverted for an
    /// active-low switch).
    pub fn poll(&mut self, now: Millis, level: bool) -> Option<ToggleEvent> {
        let rising = level && !self.last_level;
        self.last_level = level;

        if !rising {
            return None;
        }

        if let Some(last) = self.last_toggle {
            if elapsed(now, last) <= self.guard_ms {
                return None;
            }
        }

        self.last_toggle = Some(now);
        Some(ToggleEvent)
    }
}
