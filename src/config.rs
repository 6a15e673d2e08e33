//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "idle-nudge";
pub const USB_PRODUCT: &str = "Idle Nudge Mouse";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms).
pub const USB_HID_POLL_MS: u8 = 10;

/// Report ID carried in front of every mouse report.
pub const REPORT_ID_MOUSE: u8 = 1;

// GPIO pin assignments (Raspberry Pi Pico defaults)
//
// These are logical names; actual `embassy_rp::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom board.
//
//   WS2812 data        → GP16
//   Toggle button      → GP15 (active-low, internal pull-up)
//   Bootloader button  → GP28 (active-low, internal pull-up)

// Timing

/// Report emitter cadence (ms).
pub const REPORT_INTERVAL_MS: u32 = 10;

/// Button sampling cadence (ms). Bounds CPU use, not a debounce.
pub const BUTTON_POLL_INTERVAL_MS: u32 = 10;

/// Minimum spacing between two accepted toggles (ms).
pub const TOGGLE_GUARD_MS: u32 = 300;

/// Duration of the activity flash after a toggle (ms).
pub const TOGGLE_FLASH_MS: u32 = 150;

/// Duration of the activity flash after a drift nudge (ms).
pub const NUDGE_FLASH_MS: u32 = 50;

/// Amber splash shown before USB comes up (ms).
pub const BOOT_SPLASH_MS: u64 = 300;

// Movement

/// Samples in one shake burst.
pub const SHAKE_STEPS: u8 = 5;

/// Spacing between shake samples (ms).
pub const SHAKE_STEP_DELAY_MS: u32 = 20;

/// Shake samples are drawn from `-SHAKE_RANGE..=SHAKE_RANGE` per axis.
pub const SHAKE_RANGE: i8 = 3;

/// Anti-idle nudge period (ms). 10 minutes.
pub const DRIFT_PERIOD_MS: u32 = 600_000;

// Status pixel

/// Right-shift applied to each channel for the steady operating colors.
pub const STATUS_DIM_SHIFT: u8 = 1;

// Bootloader button

/// Hold time before the bootloader button reboots into BOOTSEL (ms).
pub const LONG_PRESS_MS: u32 = 3_000;

/// Error-color blinks shown before rebooting into the bootloader.
pub const BOOTLOADER_BLINKS: u8 = 5;

/// Half-period of a bootloader blink (ms).
pub const BOOTLOADER_BLINK_MS: u64 = 200;
