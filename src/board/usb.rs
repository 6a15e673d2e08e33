//! USB HID mouse on the RP2040's full-speed controller.
//!
//! The stack runs in its own task. Bus notifications are queued by a
//! [`LinkHandler`] and drained by the control loop through
//! [`UsbTransport`]; reports travel the other way through a depth-one
//! channel to [`hid_writer_task`], so "ready" simply means that channel
//! is empty while the host has the device configured and awake.

use defmt::{info, warn};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::hid::{Config as HidConfig, HidWriter, State};
use embassy_usb::{Builder, Config, UsbDevice};
use idle_nudge::config;
use idle_nudge::report::{MouseReport, Transport, UsbEvent, MOUSE_REPORT_DESCRIPTOR};
use idle_nudge::status::LinkState;
use idle_nudge::Error;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

pub type UsbDriver = Driver<'static, USB>;

/// Queued bus notifications. A full queue drops the newest event.
pub type EventChannel = Channel<CriticalSectionRawMutex, UsbEvent, 8>;
/// At most one report in flight between the control loop and the endpoint.
pub type ReportChannel = Channel<CriticalSectionRawMutex, MouseReport, 1>;

static HID_STATE: StaticCell<State> = StaticCell::new();
static USB_CONFIG_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_BOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_MSOS_DESC: StaticCell<[u8; 256]> = StaticCell::new();
static USB_CTRL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static LINK_HANDLER: StaticCell<LinkHandler> = StaticCell::new();

static USB_EVENTS: EventChannel = Channel::new();
static MOUSE_REPORTS: ReportChannel = Channel::new();

/// Turns embassy-usb device callbacks into [`UsbEvent`]s.
struct LinkHandler {
    mounted: bool,
}

impl LinkHandler {
    fn push(&self, event: UsbEvent) {
        if USB_EVENTS.try_send(event).is_err() {
            warn!("usb: event queue full, dropped {}", event);
        }
    }

    fn set_mounted(&mut self, mounted: bool) {
        if self.mounted == mounted {
            return;
        }
        self.mounted = mounted;
        self.push(if mounted {
            UsbEvent::Mounted
        } else {
            UsbEvent::Unmounted
        });
    }
}

impl embassy_usb::Handler for LinkHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.set_mounted(false);
        }
    }

    fn reset(&mut self) {
        self.set_mounted(false);
    }

    fn configured(&mut self, configured: bool) {
        self.set_mounted(configured);
    }

    fn suspended(&mut self, suspended: bool) {
        self.push(if suspended {
            UsbEvent::Suspended
        } else {
            UsbEvent::Resumed
        });
    }
}

/// Build result: the device runner, the mouse endpoint and the control
/// loop's view of both.
pub struct UsbMouse {
    pub device: UsbDevice<'static, UsbDriver>,
    pub writer: HidWriter<'static, UsbDriver, 8>,
    pub transport: UsbTransport,
}

/// Initialise the USB stack and create the HID mouse interface.
///
/// Must be called exactly once. All static buffers are consumed here.
pub fn init(usb: USB) -> UsbMouse {
    let driver = Driver::new(usb, Irqs);

    let mut usb_config = Config::new(config::USB_VID, config::USB_PID);
    usb_config.manufacturer = Some(config::USB_MANUFACTURER);
    usb_config.product = Some(config::USB_PRODUCT);
    usb_config.serial_number = Some(config::USB_SERIAL_NUMBER);
    usb_config.max_power = 100; // mA
    usb_config.max_packet_size_0 = 64;
    usb_config.supports_remote_wakeup = true;

    let mut builder = Builder::new(
        driver,
        usb_config,
        USB_CONFIG_DESC.init([0u8; 256]),
        USB_BOS_DESC.init([0u8; 256]),
        USB_MSOS_DESC.init([0u8; 256]),
        USB_CTRL_BUF.init([0u8; 64]),
    );

    builder.handler(LINK_HANDLER.init(LinkHandler { mounted: false }));

    let hid_config = HidConfig {
        report_descriptor: MOUSE_REPORT_DESCRIPTOR,
        request_handler: None,
        poll_ms: config::USB_HID_POLL_MS,
        max_packet_size: 8,
    };
    let writer = HidWriter::new(&mut builder, HID_STATE.init(State::new()), hid_config);

    let device = builder.build();

    info!("USB HID mouse initialised");

    UsbMouse {
        device,
        writer,
        transport: UsbTransport {
            events: &USB_EVENTS,
            reports: &MOUSE_REPORTS,
            link: LinkState::default(),
        },
    }
}

/// Run the USB device stack - must be spawned as a dedicated Embassy task.
pub async fn run_usb_device(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    info!("USB device task started");
    device.run().await
}

/// Moves reports from the control loop onto the interrupt endpoint.
pub async fn hid_writer_task(mut writer: HidWriter<'static, UsbDriver, 8>) -> ! {
    let mut buf = [0u8; 8];

    loop {
        let report = MOUSE_REPORTS.receive().await;
        let n = report.serialize(&mut buf);
        if let Err(e) = writer.write(&buf[..n]).await {
            warn!("USB mouse write failed: {}", e);
        }
    }
}

/// The control loop's handle on the USB side.
pub struct UsbTransport {
    events: &'static EventChannel,
    reports: &'static ReportChannel,
    link: LinkState,
}

impl Transport for UsbTransport {
    fn poll_event(&mut self) -> Option<UsbEvent> {
        let event = self.events.try_receive().ok()?;
        self.link.apply(event);
        Some(event)
    }

    fn is_ready_for_report(&self) -> bool {
        self.link.mounted && !self.link.suspended && self.reports.is_empty()
    }

    fn send_relative_report(&mut self, dx: i8, dy: i8) -> Result<(), Error> {
        self.reports
            .try_send(MouseReport::motion(dx, dy))
            .map_err(|_| Error::TransportBusy)
    }
}
