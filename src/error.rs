//! Unified error type for idle-nudge.
//!
//! We avoid `alloc` - all error variants are fieldless and `Copy`.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the firmware.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Startup
    /// The status pixel (or the peripheral behind it) could not be claimed.
    /// Fatal: the device halts showing the error color.
    IndicatorUnavailable,
    /// A firmware task could not be spawned. Fatal, like the above.
    TaskUnavailable,

    // USB
    /// The transport refused a report. The sample is dropped, never retried.
    TransportBusy,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::IndicatorUnavailable => f.write_str("status indicator unavailable"),
            Error::TaskUnavailable => f.write_str("task could not be spawned"),
            Error::TransportBusy => f.write_str("transport busy"),
        }
    }
}
