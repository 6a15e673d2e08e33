//! WS2812 status pixel driven by PIO0.
//!
//! The control loop never waits on the LED: [`StatusPixel`] stores the
//! newest color in a signal and [`led_task`] pushes it out, so a burst of
//! writes collapses into the last one.

use defmt::info;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{DMA_CH0, PIN_16, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
#[cfg(feature = "bootloader-button")]
use embassy_time::{Duration, Timer};
use idle_nudge::status::{Indicator, Rgb};
use smart_leds::RGB8;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

pub type Ws2812 = PioWs2812<'static, PIO0, 0, 1>;

static LED_COLOR: Signal<CriticalSectionRawMutex, Rgb> = Signal::new();

/// Write handle for the pixel, handed out by [`init`].
pub struct StatusPixel {
    color: &'static Signal<CriticalSectionRawMutex, Rgb>,
}

impl Indicator for StatusPixel {
    fn write_rgb(&mut self, color: Rgb) {
        self.color.signal(color);
    }
}

/// Set up the PIO state machine for a single pixel on GP16.
///
/// The PIO block, DMA channel and pin are moved out of `Peripherals`, so
/// a second claim does not compile and there is nothing to fail here.
/// The pixel only lights up once [`led_task`] is running.
pub fn init(pio: PIO0, dma: DMA_CH0, pin: PIN_16) -> (StatusPixel, Ws2812) {
    let Pio {
        mut common, sm0, ..
    } = Pio::new(pio, Irqs);
    let program = PioWs2812Program::new(&mut common);
    let ws2812 = PioWs2812::new(&mut common, sm0, dma, pin, &program);
    (StatusPixel { color: &LED_COLOR }, ws2812)
}

/// Push every new color to the pixel.
pub async fn led_task(mut ws2812: Ws2812) -> ! {
    info!("LED task started");
    loop {
        let c = LED_COLOR.wait().await;
        ws2812.write(&[RGB8::new(c.r, c.g, c.b)]).await;
    }
}

/// Blink `color` directly, bypassing the status logic.
#[cfg(feature = "bootloader-button")]
pub async fn blink(color: Rgb, times: u8, half_period: Duration) {
    for _ in 0..times {
        LED_COLOR.signal(color);
        Timer::after(half_period).await;
        LED_COLOR.signal(Rgb::OFF);
        Timer::after(half_period).await;
    }
}
