//! The control loop - one owned context ticked from `main`.
//!
//! Every [`Firmware::step`] runs, in order:
//!
//! 1. transport service + drain of queued USB notifications, so the link
//!    state is current before any motion decision is made;
//! 2. the report emitter tick;
//! 3. the button poll (rate-limited) and, on a toggle, the mode change;
//! 4. the status flash expiry check, on every step.
//!
//! Nothing here blocks or sleeps. All timing is compared against the `now`
//! passed in by the caller. Once [`Firmware::stop`] or [`Firmware::halt`]
//! has run, `step` does nothing at all.

use rand_core::RngCore;

use crate::clock::{Interval, Millis};
use crate::config;
use crate::movement::{MovementConfig, MovementGenerator, Sample, SampleKind};
use crate::report::{ReportEmitter, Transport, UsbEvent};
use crate::status::{Indicator, LinkState, LogicalStatus, StatusIndicator, SteadyStatus};
use crate::toggle::DebouncedToggle;
use crate::Error;

/// Push button, sampled as active-true.
pub trait Button {
    fn read_level(&mut self) -> bool;
}

/// Runtime tunables for the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settings {
    pub report_interval_ms: u32,
    pub button_poll_interval_ms: u32,
    pub toggle_guard_ms: u32,
    pub toggle_flash_ms: u32,
    /// Activity flash after each delivered drift nudge; `None` disables it.
    pub nudge_flash_ms: Option<u32>,
    pub movement: MovementConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            report_interval_ms: config::REPORT_INTERVAL_MS,
            button_poll_interval_ms: config::BUTTON_POLL_INTERVAL_MS,
            toggle_guard_ms: config::TOGGLE_GUARD_MS,
            toggle_flash_ms: config::TOGGLE_FLASH_MS,
            nudge_flash_ms: Some(config::NUDGE_FLASH_MS),
            movement: MovementConfig::default(),
        }
    }
}

pub struct Firmware<I, R> {
    settings: Settings,
    enabled: bool,
    stopped: bool,
    link: LinkState,
    status: StatusIndicator<I>,
    toggle: DebouncedToggle,
    button_poll: Interval,
    emitter: ReportEmitter,
    movement: MovementGenerator<R>,
}

impl<I, R> Firmware<I, R>
where
    I: Indicator,
    R: RngCore,
{
    pub fn new(led: I, rng: R, settings: Settings) -> Self {
        Self {
            settings,
            enabled: false,
            stopped: false,
            link: LinkState::default(),
            status: StatusIndicator::new(led),
            toggle: DebouncedToggle::new(settings.toggle_guard_ms),
            button_poll: Interval::new(settings.button_poll_interval_ms),
            emitter: ReportEmitter::new(settings.report_interval_ms),
            movement: MovementGenerator::new(settings.movement, rng),
        }
    }

    /// Show the booting color. Call once, before the USB stack starts.
    pub fn boot(&mut self) {
        self.status.set_status(LogicalStatus::Booting);
    }

    /// Leave the boot splash and show the steady status.
    pub fn start(&mut self) {
        info!("control loop starting");
        self.refresh_status();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn steady_status(&self) -> SteadyStatus {
        SteadyStatus::resolve(self.link, self.enabled)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn status(&self) -> &StatusIndicator<I> {
        &self.status
    }

    /// Apply a connection notification and redraw the steady status.
    pub fn handle_usb_event(&mut self, event: UsbEvent) {
        self.link.apply(event);
        info!("usb: {} -> {}", event, self.steady_status());
        self.refresh_status();
    }

    /// Flip the operating mode as if the button had been pressed.
    pub fn toggle(&mut self, now: Millis) {
        self.enabled = !self.enabled;
        if self.enabled {
            self.movement.enable(now);
        } else {
            self.movement.disable();
        }
        info!("movement {}", if self.enabled { "enabled" } else { "disabled" });
        self.status
            .flash(LogicalStatus::Activity, self.settings.toggle_flash_ms, now);
    }

    /// End normal operation. Movement goes quiet and the pixel is left to
    /// whoever takes over; later calls to [`step`](Self::step) are no-ops.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        self.enabled = false;
        self.movement.disable();
        info!("control loop stopped");
    }

    /// Stop for good on a fatal error and show the error color.
    pub fn halt(&mut self, err: Error) {
        error!("fatal: {}, halting", err);
        self.stop();
        self.status.set_status(LogicalStatus::Error);
    }

    /// One pass of the loop. Returns the sample delivered to the host, if any.
    pub fn step<T, B>(&mut self, now: Millis, transport: &mut T, button: &mut B) -> Option<Sample>
    where
        T: Transport,
        B: Button,
    {
        if self.stopped {
            return None;
        }

        transport.service_step();
        while let Some(event) = transport.poll_event() {
            self.handle_usb_event(event);
        }

        let sent = self
            .emitter
            .tick(now, self.enabled, transport, &mut self.movement);
        if let Some(sample) = sent {
            if sample.kind == SampleKind::Nudge {
                debug!("drift nudge {}", sample.motion);
                if let Some(ms) = self.settings.nudge_flash_ms {
                    self.status.flash(LogicalStatus::Activity, ms, now);
                }
            }
        }

        if self.button_poll.poll(now) && self.toggle.poll(now, button.read_level()).is_some() {
            self.toggle(now);
        }

        let steady = self.steady_status();
        self.status.poll(now, steady);

        sent
    }

    fn refresh_status(&mut self) {
        let steady = self.steady_status();
        self.status.show_steady(steady);
    }
}
