//! Raspberry Pi Pico wiring: USB, status pixel, buttons and the clock.

pub mod button;
pub mod led;
pub mod usb;

use embassy_time::Instant;
use idle_nudge::clock::{Clock, Millis};

/// Embassy uptime, truncated to wrapping milliseconds.
#[derive(Clone, Copy)]
pub struct BoardClock;

impl Clock for BoardClock {
    fn now_ms(&self) -> Millis {
        Instant::now().as_millis() as Millis
    }
}
