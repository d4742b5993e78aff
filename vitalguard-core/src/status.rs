//! The status line
//!
//! Every emission produces one line of text for the transport:
//!
//! ```text
//! STATUS,bpm=<num|NA>,temp=<num|NA>,tilt=<num|NA>
//! ```
//!
//! `bpm` and `temp` carry one fractional digit, `tilt` none. Absent vitals
//! are written `NA`, never as a default number.
//!
//! ```rust
//! use vitalguard_core::{Band, StatusLine};
//!
//! let line = StatusLine::new(Band::Critical, Some(75.0), Some(37.0), Some(0.0));
//! assert_eq!(line.to_string(), "CRITICAL,bpm=75.0,temp=37.0,tilt=0");
//!
//! let parsed: StatusLine = "NORMAL,bpm=NA,temp=24.0,tilt=NA".parse().unwrap();
//! assert_eq!(parsed.temperature, Some(24.0));
//! ```

use core::fmt::{self, Write};
use core::str::FromStr;

use heapless::String;

use crate::band::Band;
use crate::errors::{MonitorError, MonitorResult};
use crate::vitals::{Vital, VitalsState};

/// Capacity of a rendered line
///
/// The longest line with in-range vitals is about 40 bytes.
pub const LINE_CAPACITY: usize = 64;

/// Allocator-free rendered line
pub type LineBuf = String<LINE_CAPACITY>;

/// One emitted status
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusLine {
    /// Fused overall band
    pub status: Band,
    /// Smoothed heart rate
    pub bpm: Option<f32>,
    /// Calibrated temperature in °C
    pub temperature: Option<f32>,
    /// Tilt angle in degrees
    pub tilt: Option<f32>,
}

impl StatusLine {
    /// Line from explicit fields
    pub const fn new(status: Band, bpm: Option<f32>, temperature: Option<f32>, tilt: Option<f32>) -> Self {
        Self {
            status,
            bpm,
            temperature,
            tilt,
        }
    }

    /// `UNKNOWN,bpm=NA,temp=NA,tilt=NA`
    ///
    /// Sent while temperature has never been sampled.
    pub const fn placeholder() -> Self {
        Self::new(Band::Unknown, None, None, None)
    }

    /// Snapshot the current vitals under a fused status
    pub fn from_vitals(status: Band, vitals: &VitalsState) -> Self {
        Self::new(
            status,
            vitals.heart_rate_bpm(),
            vitals.temperature_c(),
            vitals.tilt_degrees(),
        )
    }

    /// Render into a fixed-capacity buffer
    pub fn render(&self) -> MonitorResult<LineBuf> {
        let mut out = LineBuf::new();
        write!(out, "{}", self).map_err(|_| MonitorError::LineOverflow)?;
        Ok(out)
    }
}

struct Field(Option<f32>, usize);

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:.*}", self.1, v),
            None => f.write_str("NA"),
        }
    }
}

impl StatusLine {
    /// Value carried for `vital`
    pub fn get(&self, vital: Vital) -> Option<f32> {
        match vital {
            Vital::HeartRate => self.bpm,
            Vital::Temperature => self.temperature,
            Vital::Tilt => self.tilt,
        }
    }

    fn field_mut(&mut self, vital: Vital) -> &mut Option<f32> {
        match vital {
            Vital::HeartRate => &mut self.bpm,
            Vital::Temperature => &mut self.temperature,
            Vital::Tilt => &mut self.tilt,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        for vital in Vital::ALL {
            let digits = if vital == Vital::Tilt { 0 } else { 1 };
            write!(f, ",{}={}", vital.key(), Field(self.get(vital), digits))?;
        }
        Ok(())
    }
}

fn parse_value(text: &str) -> MonitorResult<Option<f32>> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("NA") {
        return Ok(None);
    }
    text.parse::<f32>()
        .map(Some)
        .map_err(|_| MonitorError::MalformedStatus {
            reason: "field is not a number",
        })
}

impl FromStr for StatusLine {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(',');

        let status = parts
            .next()
            .unwrap_or_default()
            .parse::<Band>()
            .map_err(|_| MonitorError::MalformedStatus {
                reason: "unknown status",
            })?;

        let mut line = Self::new(status, None, None, None);

        for part in parts {
            let (key, value) = part.split_once('=').ok_or(MonitorError::MalformedStatus {
                reason: "field without '='",
            })?;
            let value = parse_value(value)?;
            let key = key.trim();

            let vital = Vital::ALL
                .into_iter()
                .find(|v| key.eq_ignore_ascii_case(v.key()))
                .ok_or(MonitorError::MalformedStatus {
                    reason: "unknown field",
                })?;
            *line.field_mut(vital) = value;
        }

        Ok(line)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusLine {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "{},bpm={},temp={},tilt={}",
            self.status,
            self.bpm,
            self.temperature,
            self.tilt
        )
    }
}
