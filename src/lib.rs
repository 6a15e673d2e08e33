//! Control logic for idle-nudge, an RP2040 USB mouse that keeps a host awake.
//!
//! Everything in here is hardware-agnostic and runs on the host under
//! `cargo test`. The firmware binary (`src/main.rs`, `embedded` feature)
//! supplies the three seams the logic needs:
//!
//! - [`report::Transport`] - the USB HID mouse endpoint
//! - [`status::Indicator`] - the WS2812 status pixel
//! - [`control::Button`]   - the toggle push button
//!
//! plus a [`clock::Clock`] and a random source for the shake burst.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod long_press;
pub mod movement;
pub mod report;
pub mod status;
pub mod toggle;

pub use control::{Button, Firmware, Settings};
pub use error::Error;
pub use movement::{Motion, MovementConfig, MovementGenerator};
pub use report::{MouseReport, Transport, UsbEvent};
pub use status::{Indicator, LogicalStatus, Rgb, SteadyStatus};
