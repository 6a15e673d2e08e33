//! Status pixel - maps device state to a color on a single WS2812.
//!
//! ## Colors
//!
//! | State       | Color          |
//! |-------------|----------------|
//! | Booting     | amber          |
//! | USB ready   | blue           |
//! | Host ready  | green          |
//! | Activity    | purple         |
//! | Suspended   | yellow         |
//! | Error       | red            |
//! | Running     | green, dimmed  |
//! | Paused      | red, dimmed    |
//!
//! A *flash* shows a color for a fixed time and then falls back to the
//! steady status, resolved at the moment the flash expires.

use crate::clock::{elapsed, Millis};
use crate::config::STATUS_DIM_SHIFT;
use crate::report::UsbEvent;

/// 24-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a `0xRRGGBB` literal.
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Darken every channel by `shift` bits (1 = half brightness).
    pub const fn dim(self, shift: u8) -> Self {
        Self {
            r: self.r >> shift,
            g: self.g >> shift,
            b: self.b >> shift,
        }
    }
}

/// Single addressable pixel. Fire-and-forget, no acknowledgement.
pub trait Indicator {
    fn write_rgb(&mut self, color: Rgb);
}

/// Logical states the pixel can announce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogicalStatus {
    Booting,
    UsbReady,
    HostReady,
    Activity,
    Suspended,
    Error,
}

impl LogicalStatus {
    pub const fn color(self) -> Rgb {
        match self {
            LogicalStatus::Booting => Rgb::from_hex(0xFF8000),
            LogicalStatus::UsbReady => Rgb::from_hex(0x0000FF),
            LogicalStatus::HostReady => Rgb::from_hex(0x00FF00),
            LogicalStatus::Activity => Rgb::from_hex(0xFF00FF),
            LogicalStatus::Suspended => Rgb::from_hex(0xFFFF00),
            LogicalStatus::Error => Rgb::from_hex(0xFF0000),
        }
    }
}

/// USB link as last reported by the transport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkState {
    pub mounted: bool,
    pub suspended: bool,
}

impl LinkState {
    /// Fold one bus notification into the link. Mount and unmount both
    /// clear a pending suspend.
    pub fn apply(&mut self, event: UsbEvent) {
        match event {
            UsbEvent::Mounted => {
                self.mounted = true;
                self.suspended = false;
            }
            UsbEvent::Unmounted => *self = LinkState::default(),
            UsbEvent::Suspended => self.suspended = true,
            UsbEvent::Resumed => self.suspended = false,
        }
    }
}

/// What the pixel shows when no flash is pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SteadyStatus {
    /// Bus suspended by the host. Wins over everything else.
    Suspended,
    /// Powered but not (or no longer) configured by a host.
    AwaitingHost,
    /// Configured and movement enabled.
    Running,
    /// Configured and movement disabled.
    Paused,
}

impl SteadyStatus {
    /// Resolve in priority order: suspended, not mounted, enabled.
    pub const fn resolve(link: LinkState, enabled: bool) -> Self {
        if link.suspended {
            SteadyStatus::Suspended
        } else if !link.mounted {
            SteadyStatus::AwaitingHost
        } else if enabled {
            SteadyStatus::Running
        } else {
            SteadyStatus::Paused
        }
    }

    pub const fn color(self) -> Rgb {
        match self {
            SteadyStatus::Suspended => LogicalStatus::Suspended.color(),
            SteadyStatus::AwaitingHost => LogicalStatus::UsbReady.color(),
            SteadyStatus::Running => LogicalStatus::HostReady.color().dim(STATUS_DIM_SHIFT),
            SteadyStatus::Paused => LogicalStatus::Error.color().dim(STATUS_DIM_SHIFT),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Flash {
    start: Millis,
    duration: u32,
}

/// Drives the pixel: immediate status writes plus at most one timed flash.
pub struct StatusIndicator<I> {
    led: I,
    flash: Option<Flash>,
}

impl<I: Indicator> StatusIndicator<I> {
    pub fn new(led: I) -> Self {
        Self { led, flash: None }
    }

    /// Write the color for `status` right away.
    pub fn set_status(&mut self, status: LogicalStatus) {
        self.led.write_rgb(status.color());
    }

    /// Write the steady color. A pending flash stays armed and will
    /// restore the then-current steady color when it expires.
    pub fn show_steady(&mut self, steady: SteadyStatus) {
        self.led.write_rgb(steady.color());
    }

    /// Show `status` for `duration_ms`, replacing any flash in flight.
    pub fn flash(&mut self, status: LogicalStatus, duration_ms: u32, now: Millis) {
        self.set_status(status);
        self.flash = Some(Flash {
            start: now,
            duration: duration_ms,
        });
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Expire the flash once its duration has passed, restoring `steady`.
    /// Returns `true` when a restore happened.
    pub fn poll(&mut self, now: Millis, steady: SteadyStatus) -> bool {
        match self.flash {
            Some(flash) if elapsed(now, flash.start) >= flash.duration => {
                self.flash = None;
                self.show_steady(steady);
                true
            }
            _ => false,
        }
    }

    pub fn led(&self) -> &I {
        &self.led
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<Rgb>);

    impl Indicator for Recorder {
        fn write_rgb(&mut self, color: Rgb) {
            self.0.push(color);
        }
    }

    impl Recorder {
        fn last(&self) -> Option<Rgb> {
            self.0.last().copied()
        }
    }

    const MOUNTED: LinkState = LinkState {
        mounted: true,
        suspended: false,
    };

    #[test]
    fn rgb_from_hex_and_dim() {
        let amber = Rgb::from_hex(0xFF8000);
        assert_eq!(amber, Rgb::new(0xFF, 0x80, 0x00));
        assert_eq!(amber.dim(1), Rgb::new(0x7F, 0x40, 0x00));
        assert_eq!(amber.dim(2), Rgb::new(0x3F, 0x20, 0x00));
        assert_eq!(Rgb::OFF.dim(3), Rgb::OFF);
    }

    #[test]
    fn steady_priority_order() {
        let suspended = LinkState {
            mounted: true,
            suspended: true,
        };
        assert_eq!(SteadyStatus::resolve(suspended, true), SteadyStatus::Suspended);
        assert_eq!(SteadyStatus::resolve(suspended, false), SteadyStatus::Suspended);

        let unmounted = LinkState::default();
        assert_eq!(SteadyStatus::resolve(unmounted, true), SteadyStatus::AwaitingHost);
        assert_eq!(SteadyStatus::resolve(unmounted, false), SteadyStatus::AwaitingHost);

        assert_eq!(SteadyStatus::resolve(MOUNTED, true), SteadyStatus::Running);
        assert_eq!(SteadyStatus::resolve(MOUNTED, false), SteadyStatus::Paused);
    }

    #[test]
    fn link_follows_bus_events() {
        let mut link = LinkState::default();
        link.apply(UsbEvent::Suspended);
        assert_eq!(link, LinkState { mounted: false, suspended: true });
        link.apply(UsbEvent::Mounted);
        assert_eq!(link, MOUNTED);
        link.apply(UsbEvent::Suspended);
        link.apply(UsbEvent::Resumed);
        assert_eq!(link, MOUNTED);
        link.apply(UsbEvent::Suspended);
        link.apply(UsbEvent::Unmounted);
        assert_eq!(link, LinkState::default());
    }

    #[test]
    fn steady_colors() {
        assert_eq!(SteadyStatus::Suspended.color(), Rgb::from_hex(0xFFFF00));
        assert_eq!(SteadyStatus::AwaitingHost.color(), Rgb::from_hex(0x0000FF));
        assert_eq!(SteadyStatus::Running.color(), Rgb::new(0, 0x7F, 0));
        assert_eq!(SteadyStatus::Paused.color(), Rgb::new(0x7F, 0, 0));
    }

    #[test]
    fn flash_writes_then_restores_after_duration() {
        let mut status = StatusIndicator::new(Recorder::default());
        status.flash(LogicalStatus::Activity, 150, 1_000);
        assert_eq!(status.led().last(), Some(LogicalStatus::Activity.color()));
        assert!(status.is_flashing());

        assert!(!status.poll(1_149, SteadyStatus::Paused));
        assert_eq!(status.led().last(), Some(LogicalStatus::Activity.color()));

        assert!(status.poll(1_150, SteadyStatus::Paused));
        assert_eq!(status.led().last(), Some(SteadyStatus::Paused.color()));
        assert!(!status.is_flashing());

        // Nothing left to restore.
        let writes = status.led().0.len();
        assert!(!status.poll(2_000, SteadyStatus::Running));
        assert_eq!(status.led().0.len(), writes);
    }

    #[test]
    fn restore_uses_steady_status_at_expiry() {
        let mut status = StatusIndicator::new(Recorder::default());
        status.flash(LogicalStatus::Activity, 150, 0);
        // Link changed during the flash; the caller passes the fresh value.
        assert!(status.poll(200, SteadyStatus::Suspended));
        assert_eq!(status.led().last(), Some(SteadyStatus::Suspended.color()));
    }

    #[test]
    fn new_flash_replaces_pending_one() {
        let mut status = StatusIndicator::new(Recorder::default());
        status.flash(LogicalStatus::Activity, 150, 0);
        status.flash(LogicalStatus::HostReady, 50, 100);
        assert!(!status.poll(149, SteadyStatus::Running));
        assert!(status.poll(150, SteadyStatus::Running));
    }

    #[test]
    fn flash_expiry_across_counter_wrap() {
        let mut status = StatusIndicator::new(Recorder::default());
        status.flash(LogicalStatus::Activity, 50, u32::MAX - 10);
        assert!(!status.poll(20, SteadyStatus::Running));
        assert!(status.poll(40, SteadyStatus::Running));
    }

    #[test]
    fn show_steady_keeps_flash_armed() {
        let mut status = StatusIndicator::new(Recorder::default());
        status.flash(LogicalStatus::Activity, 150, 0);
        status.show_steady(SteadyStatus::AwaitingHost);
        assert_eq!(status.led().last(), Some(SteadyStatus::AwaitingHost.color()));
        assert!(status.is_flashing());
        assert!(status.poll(150, SteadyStatus::Running));
        assert_eq!(status.led().last(), Some(SteadyStatus::Running.color()));
    }
}
