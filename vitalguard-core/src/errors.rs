//! Error Types for the Vitals Monitor
//!
//! ## Design Philosophy
//!
//! The monitor runs on microcontrollers next to the sensors, so its errors
//! follow the same rules as the rest of the core:
//!
//! 1. **Small Size**: every variant fits in a couple of machine words.
//!
//! 2. **No Heap Allocation**: context is `&'static str`, never `String`.
//!
//! 3. **Copy Semantics**: errors are cheap to return, log and store.
//!
//! ## Error Categories
//!
//! ### Configuration
//! - `InvalidConfig`: a [`MonitorConfig`](crate::config::MonitorConfig)
//!   failed validation (inverted band, zero period, ...).
//!
//! ### Parsing
//! - `UnknownBand`: text is not one of NORMAL/WARNING/CRITICAL/UNKNOWN.
//! - `MalformedStatus`: a status line does not follow
//!   `STATUS,bpm=..,temp=..,tilt=..`.
//! - `LineOverflow`: a rendered line does not fit its fixed buffer.
//!
//! ### Collaborators
//! - [`SinkError`]: the transport refused a status line.
//! - [`LabelError`]: the external temperature classifier is unusable.
//!
//! Sensor faults are deliberately absent: an implausible reading is filtered
//! or clamped by its sampler and never surfaces as an error.
//!
//! ```rust
//! use vitalguard_core::{config::MonitorConfig, MonitorError};
//!
//! let mut config = MonitorConfig::default();
//! config.schedule.emit_period_ms = 0;
//!
//! match config.validate() {
//!     Err(MonitorError::InvalidConfig { reason }) => println!("rejected: {reason}"),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Monitor errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated
        reason: &'static str,
    },

    /// Text does not name a band
    #[error("Unknown band")]
    UnknownBand,

    /// Status line could not be parsed
    #[error("Malformed status line: {reason}")]
    MalformedStatus {
        /// What was wrong with the line
        reason: &'static str,
    },

    /// Rendered status line does not fit the fixed-size buffer
    #[error("Status line overflow")]
    LineOverflow,
}

/// Failure to hand a status line to the transport
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// Transport queue cannot take more lines right now
    #[error("Status sink full")]
    Full,

    /// Transport has gone away
    #[error("Status sink disconnected")]
    Disconnected,
}

/// Failure of the external temperature classifier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelError {
    /// No classifier is attached or it stopped answering
    #[error("Label source unavailable")]
    Unavailable,

    /// Classifier answered with something that is not a band
    #[error("Label rejected")]
    Rejected,
}

#[cfg(feature = "defmt")]
impl defmt::Format for MonitorError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidConfig { reason } => defmt::write!(fmt, "Invalid config: {}", reason),
            Self::UnknownBand => defmt::write!(fmt, "Unknown band"),
            Self::MalformedStatus { reason } => defmt::write!(fmt, "Malformed status: {}", reason),
            Self::LineOverflow => defmt::write!(fmt, "Status line overflow"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for SinkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Full => defmt::write!(fmt, "Sink full"),
            Self::Disconnected => defmt::write!(fmt, "Sink disconnected"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LabelError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Unavailable => defmt::write!(fmt, "Label unavailable"),
            Self::Rejected => defmt::write!(fmt, "Label rejected"),
        }
    }
}
