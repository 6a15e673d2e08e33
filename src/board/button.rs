//! GPIO push buttons (active-low with internal pull-up).
//!
//!   - GP15 - toggle, sampled by the control loop
//!   - GP28 - bootloader, held to reboot into BOOTSEL (`bootloader-button`)

use embassy_rp::gpio::{AnyPin, Input, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use idle_nudge::control::Button;

/// Bootloader request from the long press, answered by the control loop.
pub static HANDOVER: Handover = Handover::new();

/// Two-way handshake: the button task asks, the control loop stops and
/// releases, and only then does the button task touch the pixel.
pub struct Handover {
    requested: Signal<CriticalSectionRawMutex, ()>,
    released: Signal<CriticalSectionRawMutex, ()>,
}

impl Handover {
    const fn new() -> Self {
        Self {
            requested: Signal::new(),
            released: Signal::new(),
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.signaled()
    }

    /// Called by the control loop once it has stopped for good.
    pub fn release(&self) {
        self.released.signal(());
    }

    #[cfg(feature = "bootloader-button")]
    async fn request(&self) {
        self.requested.signal(());
        self.released.wait().await;
    }
}

/// Toggle button, read without waiting. Edge handling lives in the
/// control loop.
pub struct ToggleButton {
    pin: Input<'static>,
}

impl ToggleButton {
    pub fn new(pin: AnyPin) -> Self {
        Self {
            pin: Input::new(pin, Pull::Up),
        }
    }
}

impl Button for ToggleButton {
    fn read_level(&mut self) -> bool {
        self.pin.is_low()
    }
}

#[cfg(feature = "bootloader-button")]
pub use self::bootloader::bootloader_task;

#[cfg(feature = "bootloader-button")]
mod bootloader {
    use defmt::info;
    use embassy_rp::gpio::{AnyPin, Input, Pull};
    use embassy_time::{Duration, Ticker};
    use idle_nudge::clock::Clock;
    use idle_nudge::config::{
        BOOTLOADER_BLINKS, BOOTLOADER_BLINK_MS, BUTTON_POLL_INTERVAL_MS, LONG_PRESS_MS,
    };
    use idle_nudge::long_press::LongPress;
    use idle_nudge::status::LogicalStatus;

    use super::HANDOVER;
    use crate::board::{led, BoardClock};

    /// Watch the bootloader button. A long press stops the control loop,
    /// blinks the pixel and hands the chip to the ROM USB bootloader.
    pub async fn bootloader_task(pin: AnyPin) -> ! {
        let pin = Input::new(pin, Pull::Up);
        let mut press = LongPress::new(LONG_PRESS_MS);
        let mut ticker = Ticker::every(Duration::from_millis(u64::from(BUTTON_POLL_INTERVAL_MS)));

        loop {
            ticker.next().await;
            if let Some(event) = press.poll(BoardClock.now_ms(), pin.is_low()) {
                info!("bootloader button held {} ms, rebooting to BOOTSEL", event.held_ms);
                HANDOVER.request().await;
                led::blink(
                    LogicalStatus::Error.color(),
                    BOOTLOADER_BLINKS,
                    Duration::from_millis(BOOTLOADER_BLINK_MS),
                )
                .await;
                embassy_rp::rom_data::reset_to_usb_boot(0, 0);
                loop {
                    cortex_m::asm::wfe();
                }
            }
        }
    }
}
