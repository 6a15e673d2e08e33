//! idle-nudge firmware for the Raspberry Pi Pico.
//!
//! Boot order: claim the status pixel, show the booting color for a short
//! splash, bring up USB, then hand over to the control loop, which yields
//! to the executor between passes. It only leaves the loop to park, either
//! on a fatal error or for the bootloader handover.

#![no_std]
#![no_main]

mod board;

use defmt::{error, info};
use embassy_executor::{SpawnError, Spawner};
use embassy_futures::yield_now;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::Pin;
use embassy_time::Timer;
use embassy_usb::class::hid::HidWriter;
use embassy_usb::UsbDevice;
use idle_nudge::clock::Clock;
use idle_nudge::config::BOOT_SPLASH_MS;
use idle_nudge::{Error, Firmware, Settings};

use board::button::{ToggleButton, HANDOVER};
use board::usb::{UsbDriver, UsbMouse, UsbTransport};
use board::{led, usb, BoardClock};

use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::task]
async fn usb_task(device: UsbDevice<'static, UsbDriver>) -> ! {
    usb::run_usb_device(device).await
}

#[embassy_executor::task]
async fn hid_task(writer: HidWriter<'static, UsbDriver, 8>) -> ! {
    usb::hid_writer_task(writer).await
}

#[embassy_executor::task]
async fn led_task(ws2812: led::Ws2812) -> ! {
    led::led_task(ws2812).await
}

#[cfg(feature = "bootloader-button")]
#[embassy_executor::task]
async fn bootloader_task(pin: embassy_rp::gpio::AnyPin) -> ! {
    board::button::bootloader_task(pin).await
}

fn spawn_usb(spawner: &Spawner, usb: UsbMouse) -> Result<UsbTransport, SpawnError> {
    spawner.spawn(usb_task(usb.device))?;
    spawner.spawn(hid_task(usb.writer))?;
    Ok(usb.transport)
}

/// Give the executor to the other tasks for good.
async fn park() -> ! {
    loop {
        core::future::pending::<()>().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("idle-nudge v{}", env!("CARGO_PKG_VERSION"));

    let (pixel, ws2812) = led::init(p.PIO0, p.DMA_CH0, p.PIN_16);
    if let Err(e) = spawner.spawn(led_task(ws2812)) {
        // The driver went down with the task; there is no pixel to light.
        error!("LED task: {}", e);
        error!("fatal: {}, halting", Error::IndicatorUnavailable);
        return park().await;
    }

    let mut firmware = Firmware::new(pixel, RoscRng, Settings::default());
    firmware.boot();
    Timer::after_millis(BOOT_SPLASH_MS).await;

    let mut transport = match spawn_usb(&spawner, usb::init(p.USB)) {
        Ok(transport) => transport,
        Err(e) => {
            error!("USB tasks: {}", e);
            firmware.halt(Error::TaskUnavailable);
            return park().await;
        }
    };

    #[cfg(feature = "bootloader-button")]
    {
        if let Err(e) = spawner.spawn(bootloader_task(p.PIN_28.degrade())) {
            defmt::warn!("bootloader button unavailable: {}", e);
        }
    }

    let mut toggle = ToggleButton::new(p.PIN_15.degrade());
    let clock = BoardClock;

    firmware.start();
    loop {
        if HANDOVER.is_requested() {
            firmware.stop();
            HANDOVER.release();
            return park().await;
        }
        firmware.step(clock.now_ms(), &mut transport, &mut toggle);
        yield_now().await;
    }
}
