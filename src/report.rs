//! Mouse report on the wire, and the emitter that feeds it once per tick.
//!
//! ```text
//! [0] report id   [1] buttons   [2] x   [3] y   [4] wheel   [5] pan
//! ```

use rand_core::RngCore;

use crate::clock::{Interval, Millis};
use crate::config::REPORT_ID_MOUSE;
use crate::movement::{Motion, MovementGenerator, Sample};
use crate::Error;

/// Mouse report size in bytes, report ID included.
pub const MOUSE_REPORT_SIZE: usize = 6;

/// One input report on the mouse endpoint.
///
/// Only `x`/`y` are ever non-zero here; the remaining fields exist so the
/// report matches a regular five-button wheel mouse.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MouseReport {
    pub buttons: u8,
    pub x: i8,
    pub y: i8,
    pub wheel: i8,
    pub pan: i8,
}

impl MouseReport {
    pub const fn motion(dx: i8, dy: i8) -> Self {
        Self {
            x: dx,
            y: dy,
            buttons: 0,
            wheel: 0,
            pan: 0,
        }
    }

    /// Write the wire bytes, report ID first. Returns the length written,
    /// or 0 when `buf` cannot hold a whole report.
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        let Some(out) = buf.get_mut(..MOUSE_REPORT_SIZE) else {
            return 0;
        };
        out.copy_from_slice(&[
            REPORT_ID_MOUSE,
            self.buttons,
            self.x as u8,
            self.y as u8,
            self.wheel as u8,
            self.pan as u8,
        ]);
        MOUSE_REPORT_SIZE
    }
}

/// HID report descriptor for [`MouseReport`]: report ID 1, five buttons,
/// relative X/Y, wheel and AC Pan, all 8-bit signed.
#[rustfmt::skip]
pub const MOUSE_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01,             // USAGE_PAGE Generic Desktop
    0x09, 0x02,             // USAGE Mouse
    0xA1, 0x01,             // COLLECTION Application
    0x85, REPORT_ID_MOUSE,  //  REPORT_ID
    0x09, 0x01,             //  USAGE Pointer
    0xA1, 0x00,             //  COLLECTION Physical

    // buttons: 5 x 1 bit, then 3 bits of padding
    0x05, 0x09, 0x19, 0x01, 0x29, 0x05,
    0x15, 0x00, 0x25, 0x01,
    0x95, 0x05, 0x75, 0x01, 0x81, 0x02,
    0x95, 0x01, 0x75, 0x03, 0x81, 0x01,

    // x, y: 2 x 8 bit relative
    0x05, 0x01, 0x09, 0x30, 0x09, 0x31,
    0x15, 0x81, 0x25, 0x7F,
    0x95, 0x02, 0x75, 0x08, 0x81, 0x06,

    // wheel: 8 bit relative
    0x09, 0x38,
    0x15, 0x81, 0x25, 0x7F,
    0x95, 0x01, 0x75, 0x08, 0x81, 0x06,

    // AC Pan (consumer page): 8 bit relative
    0x05, 0x0C, 0x0A, 0x38, 0x02,
    0x15, 0x81, 0x25, 0x7F,
    0x95, 0x01, 0x75, 0x08, 0x81, 0x06,

    0xC0,                   //  END_COLLECTION
    0xC0,                   // END_COLLECTION
];

/// Connection notifications raised by the USB stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UsbEvent {
    Mounted,
    Unmounted,
    Suspended,
    Resumed,
}

/// USB side of the device, as seen by the control loop.
pub trait Transport {
    /// Drain pending protocol work. Stacks that run on their own (an
    /// interrupt or a separate task) leave this as a no-op.
    fn service_step(&mut self) {}

    /// Next queued connection notification, oldest first.
    fn poll_event(&mut self) -> Option<UsbEvent>;

    fn is_ready_for_report(&self) -> bool;

    fn send_relative_report(&mut self, dx: i8, dy: i8) -> Result<(), Error>;
}

/// Once per tick, pulls the due sample from the generator and hands it to
/// the transport. Nothing is queued: a tick on which the transport is not
/// ready does not consult the generator at all.
pub struct ReportEmitter {
    cadence: Interval,
}

impl ReportEmitter {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            cadence: Interval::new(interval_ms),
        }
    }

    /// Run one tick. Returns the sample that reached the transport.
    pub fn tick<T, R>(
        &mut self,
        now: Millis,
        enabled: bool,
        transport: &mut T,
        movement: &mut MovementGenerator<R>,
    ) -> Option<Sample>
    where
        T: Transport,
        R: RngCore,
    {
        if !self.cadence.poll(now) {
            return None;
        }
        if !transport.is_ready_for_report() || !enabled {
            return None;
        }

        let sample = movement.next_sample(now)?;
        if sample.motion.is_zero() {
            return None;
        }

        let Motion { dx, dy } = sample.motion;
        match transport.send_relative_report(dx, dy) {
            Ok(()) => {
                trace!("report: dx={} dy={}", dx, dy);
                Some(sample)
            }
            Err(e) => {
                warn!("report dropped: {}", e);
                None
            }
        }
    }
}
