//! Core vitals monitor for VitalGuard
//!
//! Samples heart rate, temperature and tilt on a single cooperative loop,
//! fuses them into one severity band and hands a status line to a
//! transport. Designed for the microcontroller next to the sensors.
//!
//! Key constraints:
//! - No heap allocation, no threads, no locks
//! - Every sampler is a resumable state machine that never blocks
//! - Missing data is UNKNOWN, never a default number
//!
//! ```no_run
//! use vitalguard_core::hal::{AnalogInput, DigitalInput, StdDelay};
//! use vitalguard_core::time::MonotonicClock;
//! use vitalguard_core::{Monitor, MonitorConfig, Peripherals, SinkError, StatusLine, StatusSink};
//!
//! struct Adc;
//! impl AnalogInput for Adc {
//!     fn read_u16(&mut self) -> u16 { 0 }
//! }
//!
//! struct Pin;
//! impl DigitalInput for Pin {
//!     fn is_high(&mut self) -> bool { true }
//! }
//!
//! struct Stdout;
//! impl StatusSink for Stdout {
//!     fn emit(&mut self, line: &StatusLine) -> nb::Result<(), SinkError> {
//!         println!("{line}");
//!         Ok(())
//!     }
//! }
//!
//! let peripherals = Peripherals { heart_rate: Adc, temperature: Adc, tilt: Pin, button: Pin };
//! let mut monitor = Monitor::without_labels(MonitorConfig::default(), peripherals, Stdout)?;
//! monitor.run(&MonotonicClock::new(), &mut StdDelay);
//! # Ok::<(), vitalguard_core::MonitorError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Optional logging: `log` on hosts, `defmt` on probes, nothing otherwise
#[cfg(feature = "log")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! log_trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! log_debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! log_info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! log_warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}

pub mod band;
pub mod buffer;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod errors;
pub mod hal;
pub mod monitor;
pub mod samplers;
pub mod status;
pub mod time;
pub mod traits;
pub mod vitals;

// Public API
pub use band::{fuse, Band, BandThresholds, Classifier, ComponentBands};
pub use config::{MonitorConfig, TemperatureBanding};
pub use debounce::EdgeDetector;
pub use errors::{LabelError, MonitorError, MonitorResult, SinkError};
pub use monitor::{Monitor, MonitorStats, Peripherals};
pub use status::StatusLine;
pub use time::{TimeSource, Timestamp};
pub use traits::{LabelSource, NoLabels, StatusSink};
pub use vitals::{Vital, VitalsState};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
