//! Hold-to-trigger detector for the bootloader button.
//!
//! Fires once when the level has stayed high for `hold_ms`; the button has
//! to be released before it can fire again.

use crate::clock::{elapsed, Millis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LongPressEvent {
    /// How long the button had been held when the event fired.
    pub held_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Released,
    Held { since: Millis },
    Fired,
}

#[derive(Clone, Copy, Debug)]
pub struct LongPress {
    hold_ms: u32,
    phase: Phase,
}

impl LongPress {
    pub const fn new(hold_ms: u32) -> Self {
        Self {
            hold_ms,
            phase: Phase::Released,
        }
    }

    pub fn poll(&mut self, now: Millis, level: bool) -> Option<LongPressEvent> {
        if !level {
            self.phase = Phase::Released;
            return None;
        }

        match self.phase {
            Phase::Released => {
                self.phase = Phase::Held { since: now };
                None
            }
            Phase::Held { since } => {
                let held_ms = elapsed(now, since);
                if held_ms >= self.hold_ms {
                    self.phase = Phase::Fired;
                    Some(LongPressEvent { held_ms })
                } else {
                    None
                }
            }
            Phase::Fired => None,
        }
    }

    /// `true` while the button is down and has not fired yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.phase, Phase::Held { .. })
    }
}
