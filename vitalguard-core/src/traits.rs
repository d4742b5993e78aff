//! Collaborator Traits
//!
//! The monitor hands status lines to a transport and, in
//! [`External`](crate::config::TemperatureBanding::External) banding mode,
//! asks a remote classifier for a temperature label. Both collaborators are
//! polled, never awaited, using `nb::Result`:
//!
//! - `Ok(_)`: done
//! - `Err(nb::Error::WouldBlock)`: not ready (queue full, label not back yet)
//! - `Err(nb::Error::Other(e))`: gave up
//!
//! ```rust
//! use vitalguard_core::traits::StatusSink;
//! use vitalguard_core::{SinkError, StatusLine};
//!
//! struct Console;
//!
//! impl StatusSink for Console {
//!     fn emit(&mut self, line: &StatusLine) -> nb::Result<(), SinkError> {
//!         println!("{line}");
//!         Ok(())
//!     }
//! }
//! ```

use crate::band::Band;
use crate::errors::{LabelError, SinkError};
use crate::status::StatusLine;

pub use crate::samplers::Sampler;
pub use crate::time::TimeSource;

/// Transport for emitted status lines
///
/// The monitor calls `emit` once per emission and never retries: a
/// `WouldBlock` or error is logged and the line is dropped.
pub trait StatusSink {
    /// Hand off one line
    fn emit(&mut self, line: &StatusLine) -> nb::Result<(), SinkError>;

    /// Monitoring was toggled by the button
    fn announce(&mut self, _monitoring: bool) {}
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn emit(&mut self, line: &StatusLine) -> nb::Result<(), SinkError> {
        (**self).emit(line)
    }

    fn announce(&mut self, monitoring: bool) {
        (**self).announce(monitoring)
    }
}

/// Remote temperature classifier
///
/// One request is outstanding at a time. After `request` the monitor polls
/// `poll_label` on every step until it yields or the label timeout elapses;
/// an error, a timeout or an `UNKNOWN` answer all fuse as UNKNOWN.
pub trait LabelSource {
    /// Send a temperature for classification
    fn request(&mut self, temperature_c: f32) -> Result<(), LabelError>;

    /// Check whether the answer has arrived
    fn poll_label(&mut self) -> nb::Result<Band, LabelError>;
}

impl<L: LabelSource + ?Sized> LabelSource for &mut L {
    fn request(&mut self, temperature_c: f32) -> Result<(), LabelError> {
        (**self).request(temperature_c)
    }

    fn poll_label(&mut self) -> nb::Result<Band, LabelError> {
        (**self).poll_label()
    }
}

/// No classifier attached
///
/// Used with local temperature banding, where it is never consulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoLabels;

impl LabelSource for NoLabels {
    fn request(&mut self, _temperature_c: f32) -> Result<(), LabelError> {
        Err(LabelError::Unavailable)
    }

    fn poll_label(&mut self) -> nb::Result<Band, LabelError> {
        Err(nb::Error::Other(LabelError::Unavailable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_labels_is_unavailable() {
        let mut labels = NoLabels;
        assert_eq!(labels.request(25.0), Err(LabelError::Unavailable));
        assert_eq!(
            labels.poll_label(),
            Err(nb::Error::Other(LabelError::Unavailable))
        );
    }

    #[test]
    fn sink_through_reference() {
        struct Count(usize);

        impl StatusSink for Count {
            fn emit(&mut self, _line: &StatusLine) -> nb::Result<(), SinkError> {
                self.0 += 1;
                Ok(())
            }
        }

        let mut count = Count(0);
        {
            let mut by_ref = &mut count;
            by_ref.emit(&StatusLine::placeholder()).unwrap();
            by_ref.announce(true);
        }
        assert_eq!(count.0, 1);
    }
}
